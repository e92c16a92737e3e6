use std::time::Duration;

use clap::Parser;

/// Desktop dashboard for a SEN55 air quality sensor node.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// URL of the sensor node's data endpoint.
    #[arg(
        long,
        env = "AIR_DASHBOARD_ENDPOINT",
        default_value = "http://127.0.0.1/api/data"
    )]
    pub endpoint: String,

    /// Seconds between two refreshes.
    #[arg(
        long,
        env = "AIR_DASHBOARD_INTERVAL_SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Seconds before a request is given up.
    #[arg(
        long,
        env = "AIR_DASHBOARD_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Show bundled sample data instead of polling the sensor node.
    #[arg(long, env = "AIR_DASHBOARD_DUMMY")]
    pub dummy: bool,
}

impl Args {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn explicit_options() {
        let args = Args::try_parse_from([
            "air-dashboard",
            "--endpoint",
            "http://192.168.1.40:8080/api/data",
            "--interval-secs",
            "60",
            "--timeout-secs",
            "5",
            "--dummy",
        ])
        .unwrap();

        assert_eq!(args.endpoint, "http://192.168.1.40:8080/api/data");
        assert_eq!(args.interval(), Duration::from_secs(60));
        assert_eq!(args.timeout(), Duration::from_secs(5));
        assert!(args.dummy);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Args::try_parse_from(["air-dashboard", "--interval-secs", "0"]).is_err());
    }
}
