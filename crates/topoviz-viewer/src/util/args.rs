use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::util::config::ViewerConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerArgs {
    pub server: Option<String>,
    pub protocol: Option<String>,
    pub import: Option<PathBuf>,
    pub replay: Option<PathBuf>,
}

impl ViewerArgs {
    /// Command-line values win over the config file.
    pub fn apply_to(&self, cfg: &mut ViewerConfig) {
        if let Some(server) = &self.server {
            cfg.server_url = server.clone();
        }
        if let Some(protocol) = &self.protocol {
            cfg.default_protocol = protocol.clone();
        }
        cfg.normalize();
    }
}

pub fn parse_args() -> Result<ViewerArgs> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ViewerArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = ViewerArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--server" {
            let Some(url) = args.next() else {
                anyhow::bail!("--server expects a url");
            };
            out.server = Some(url.to_string_lossy().trim_end_matches('/').to_string());
        } else if arg == "--protocol" {
            let Some(name) = args.next() else {
                anyhow::bail!("--protocol expects a name");
            };
            out.protocol = Some(name.to_string_lossy().to_string());
        } else if arg == "--import" {
            let Some(path) = args.next() else {
                anyhow::bail!("--import expects a path");
            };
            out.import = Some(PathBuf::from(path));
        } else if arg == "--replay" {
            let Some(path) = args.next() else {
                anyhow::bail!("--replay expects a path");
            };
            out.replay = Some(PathBuf::from(path));
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_all_flags() {
        let parsed = parse_args_from(args(&[
            "--server",
            "http://10.1.1.1:5000/",
            "--protocol",
            "bellman_ford",
            "--import",
            "topo.json",
            "--replay",
            "steps.json",
        ]))
        .expect("args parsed");

        assert_eq!(parsed.server.as_deref(), Some("http://10.1.1.1:5000"));
        assert_eq!(parsed.protocol.as_deref(), Some("bellman_ford"));
        assert_eq!(parsed.import, Some(PathBuf::from("topo.json")));
        assert_eq!(parsed.replay, Some(PathBuf::from("steps.json")));
    }

    #[test]
    fn rejects_unknown_or_incomplete_flags() {
        assert!(parse_args_from(args(&["--verbose"])).is_err());
        assert!(parse_args_from(args(&["--server"])).is_err());
    }

    #[test]
    fn flags_override_config() {
        let parsed = parse_args_from(args(&["--protocol", "rip"])).expect("args parsed");
        let mut cfg = ViewerConfig::default();
        parsed.apply_to(&mut cfg);

        assert_eq!(cfg.default_protocol, "rip");
        assert!(cfg.protocols.contains(&"rip".to_string()));
        assert_eq!(cfg.server_url, ViewerConfig::default().server_url);
    }
}
