// Copyright (C) 2025 Thousand Worlds contributors. This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use clap::Parser;
use figment::providers::{Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// CLI flags, also accepted as `SERVER_*` environment variables and as keys
/// in an optional YAML config file layered on top.
#[derive(Parser, Debug, Serialize, Deserialize, Clone)]
#[command(name = "core-server")]
#[command(about = "Real-time session hub, command dispatcher, and world tick manager")]
#[command(version)]
pub struct Args {
    /// HTTP listen address for the WebSocket upgrade and health endpoints.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub listen_address: String,

    /// Default time-dilation factor applied to newly spawned world tickers.
    #[arg(long, default_value = "1.0")]
    pub default_dilation: f64,

    /// Enable debug-level logging when `RUST_LOG` is unset.
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Optional YAML config file layered over the CLI defaults.
    #[arg(long)]
    pub config_file: Option<String>,
}

impl Args {
    /// Loads CLI flags, then overlays a YAML config file (if given) and the
    /// `SERVER_*` environment, in that order of increasing precedence.
    pub fn load() -> Result<Self, figment::Error> {
        let cli_args = Args::parse();
        let config_file = cli_args.config_file.clone();

        let mut config = Figment::new().merge(Serialized::defaults(cli_args));
        if let Some(config_file) = config_file {
            config = config.merge(Yaml::file(config_file));
        }
        config = config.merge(figment::providers::Env::prefixed("SERVER_"));

        config.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_empty_cli() {
        let args = Args::parse_from(["core-server"]);
        assert_eq!(args.listen_address, "0.0.0.0:8080");
        assert_eq!(args.default_dilation, 1.0);
        assert!(!args.debug);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["core-server", "--listen-address", "127.0.0.1:9000", "--default-dilation", "2.5"]);
        assert_eq!(args.listen_address, "127.0.0.1:9000");
        assert_eq!(args.default_dilation, 2.5);
    }
}
