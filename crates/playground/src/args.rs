use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "playground",
    version,
    about = "Request an optimized pick route and inspect its metrics and playback"
)]
pub struct Args {
    /// Comma separated SKUs to pick
    #[arg(long, default_value = "")]
    pub skus: String,

    /// Optimization strategy (nearest_neighbor, enhanced_two_opt, or_opt, hybrid)
    #[arg(long, default_value = "enhanced_two_opt")]
    pub strategy: String,

    /// Location code to start from
    #[arg(long, default_value = "")]
    pub start: String,

    /// Location code to end at
    #[arg(long, default_value = "")]
    pub end: String,

    /// Send complete constraints and weights instead of leaving them to the service
    #[arg(long, default_value_t = false)]
    pub full_settings: bool,

    /// Skip the service and use the bundled sample route
    #[arg(long, default_value_t = false)]
    pub sample: bool,

    /// Number of evenly spaced playback frames to print
    #[arg(long, default_value_t = 5)]
    pub frames: usize,

    /// Print the route as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Print the JSON schema of the optimize request and exit
    #[arg(long, default_value_t = false)]
    pub schema: bool,

    /// Print the service endpoints and check the health endpoint
    #[arg(long, default_value_t = false)]
    pub health: bool,
}
