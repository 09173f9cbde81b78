use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Stream reports into ClickHouse until interrupted
    Run {
        #[arg(long, help = "Load additional variables from this .env file")]
        env_file: Option<String>,

        #[arg(long, help = "Override the flush interval, in milliseconds")]
        flush_interval_ms: Option<u64>,

        #[arg(long, help = "Override the report queue capacity")]
        queue_capacity: Option<usize>,

        #[arg(long, help = "Serve /metrics on this port, 0 disables the exporter")]
        metrics_port: Option<u16>,
    },
    /// Check that ClickHouse accepts the configured credentials
    TestConn {
        #[arg(long, help = "Load additional variables from this .env file")]
        env_file: Option<String>,
    },
    /// Show the path between two grid locators
    Locate {
        /// Locator of the sending station
        from: String,

        /// Locator of the receiving station
        to: String,

        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },
}
