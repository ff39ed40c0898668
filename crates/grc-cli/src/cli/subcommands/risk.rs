use clap::Subcommand;

/// Risk register commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RiskCommands {
    /// Register a risk.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        likelihood: u8,
        #[arg(long)]
        impact: u8,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Update a risk.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        likelihood: Option<u8>,
        #[arg(long)]
        impact: Option<u8>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Get a risk with its score, level, and KRIs.
    Get { id: String },
    /// List risks, highest score first.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Move a risk to another status.
    Transition { id: String, status: String },
    /// Delete a risk and its KRIs.
    Delete { id: String },
    /// Likelihood x impact heat map of open risks.
    Heatmap,
    /// Attach a key risk indicator to a risk.
    #[command(name = "kri-add")]
    KriAdd {
        risk: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        target: f64,
        #[arg(long)]
        warning: f64,
        #[arg(long)]
        critical: f64,
        /// higher-is-worse (default) or lower-is-worse.
        #[arg(long)]
        direction: Option<String>,
    },
    /// List a risk's KRIs with their bands.
    #[command(name = "kri-list")]
    KriList { risk: String },
    /// Record a KRI reading.
    #[command(name = "kri-record")]
    KriRecord { kri: String, value: f64 },
}
