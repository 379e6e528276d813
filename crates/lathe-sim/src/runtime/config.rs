#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub show_help: bool,
    pub bind_addr: String,
    pub server_enabled: bool,
    pub sample_interval_ms: u64,
    pub cycle_interval_ms: u64,
    pub start_disabled: bool,
    pub json_logs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            show_help: false,
            bind_addr: "127.0.0.1:4840".to_string(),
            server_enabled: true,
            sample_interval_ms: 1_000,
            cycle_interval_ms: lathe_core::PRODUCTION_INTERVAL.as_millis() as u64,
            start_disabled: false,
            json_logs: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RuntimeConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--bind" => {
                    if i + 1 < args.len() {
                        cfg.bind_addr = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--no-server" => {
                    cfg.server_enabled = false;
                }
                "--sample-interval" => {
                    if i + 1 < args.len() {
                        cfg.sample_interval_ms =
                            args[i + 1].parse().unwrap_or(cfg.sample_interval_ms);
                        i += 1;
                    }
                }
                "--cycle-interval" => {
                    if i + 1 < args.len() {
                        cfg.cycle_interval_ms =
                            args[i + 1].parse().unwrap_or(cfg.cycle_interval_ms);
                        i += 1;
                    }
                }
                "--start-disabled" => {
                    cfg.start_disabled = true;
                }
                "--json-logs" => {
                    cfg.json_logs = true;
                }
                "--help" | "-h" => {
                    cfg.show_help = true;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        cfg
    }

    pub fn print_help() {
        println!(
            r#"lathe-sim - simulated lathe with an interactive console and telemetry publishing

USAGE:
    lathe-sim [OPTIONS]

OPTIONS:
    --bind <ADDR>            Telemetry TCP bind address [default: 127.0.0.1:4840]
    --no-server              Disable the telemetry server (console only)
    --sample-interval <MS>   Telemetry sampling interval [default: 1000]
    --cycle-interval <MS>    Production cycle interval [default: 10000]
    --start-disabled         Start with the device disabled
    --json-logs              Output logs in JSON format (for log aggregation)
    -h, --help               Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                 Set log filter (e.g., RUST_LOG=debug,lathe_sim=trace)

CONSOLE COMMANDS:
    produce [N]  reject [N]  help  stop  status
    disable  enable  toggle  reset  fail
"#
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("lathe-sim")
            .chain(values.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn defaults_match_the_reference_values() {
        let cfg = RuntimeConfig::from_args(&args(&[]));
        assert_eq!(cfg.bind_addr, "127.0.0.1:4840");
        assert!(cfg.server_enabled);
        assert_eq!(cfg.sample_interval_ms, 1_000);
        assert_eq!(cfg.cycle_interval_ms, 10_000);
        assert!(!cfg.start_disabled);
        assert!(!cfg.json_logs);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = RuntimeConfig::from_args(&args(&[
            "--bind",
            "0.0.0.0:7001",
            "--sample-interval",
            "250",
            "--no-server",
            "--start-disabled",
        ]));
        assert_eq!(cfg.bind_addr, "0.0.0.0:7001");
        assert_eq!(cfg.sample_interval_ms, 250);
        assert!(!cfg.server_enabled);
        assert!(cfg.start_disabled);
    }

    #[test]
    fn malformed_interval_keeps_the_default() {
        let cfg = RuntimeConfig::from_args(&args(&["--cycle-interval", "soon"]));
        assert_eq!(cfg.cycle_interval_ms, 10_000);
    }
}
