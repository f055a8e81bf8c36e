//! CLI argument definitions for brecha.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use rust_decimal::Decimal;

use brecha::project::{BudgetMode, ItemState, Priority};

#[derive(Parser)]
#[command(name = "brecha")]
#[command(version)]
#[command(about = "Remediation project tracking for compliance gaps", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    brecha init --org \"Acme\"\n    brecha project add --codigo A9 --nombre \"Control de accesos\" --inicio 2026-01-01 --fin 2026-06-30\n    brecha item add A9 --nombre \"Politica\" --responsable ana --planificado 1000 --inicio 2026-01-05 --duracion 10"
)]
pub struct Cli {
    /// Print a single JSON envelope instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter (e.g. debug, info, brecha=debug). Overrides BRECHA_LOG
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize brecha in the current directory
    Init {
        /// Organization name written to config.md
        #[arg(long)]
        org: Option<String>,
        /// Overwrite an existing config.md
        #[arg(long)]
        force: bool,
    },
    /// Manage remediation projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage the items of a project
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Request closure approval for a project
    Request {
        /// Project ID or codigo
        project: String,
        /// Name of the person requesting approval
        #[arg(long)]
        by: String,
        /// Comments for the validator
        #[arg(long)]
        comentarios: Option<String>,
        /// Assign the request to a specific validator
        #[arg(long)]
        validador: Option<String>,
    },
    /// Approve a pending closure request
    Approve {
        /// Project ID or codigo
        project: String,
        /// Approval request number
        request: u32,
        /// Name of the validator
        #[arg(long)]
        by: String,
        /// Optional observations
        #[arg(long)]
        observaciones: Option<String>,
    },
    /// Reject a pending closure request
    Reject {
        /// Project ID or codigo
        project: String,
        /// Approval request number
        request: u32,
        /// Name of the validator
        #[arg(long)]
        by: String,
        /// Reason for rejection (required)
        #[arg(long)]
        observaciones: String,
    },
    /// Show the approval status of a project
    Status {
        /// Project ID or codigo
        project: String,
    },
    /// Serve the JSON-RPC API over stdio
    Serve,
    /// Show version information
    Version {
        /// Show commit and build date
        #[arg(long, short)]
        verbose: bool,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    Add(ProjectAddArgs),
    /// List projects with their budget summary
    List,
    /// Show a project with aggregates and items
    Show {
        /// Project ID or codigo
        project: String,
    },
    /// planificado → en_ejecucion
    Start {
        /// Project ID or codigo
        project: String,
    },
    /// Suspend a project
    Suspend {
        /// Project ID or codigo
        project: String,
    },
    /// Resume a suspended project
    Resume {
        /// Project ID or codigo
        project: String,
    },
    /// Cancel a project
    Cancel {
        /// Project ID or codigo
        project: String,
    },
    /// Record total spend on a global-budget project
    Spend {
        /// Project ID or codigo
        project: String,
        /// Total amount spent so far
        amount: Decimal,
    },
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Short unique project code
    #[arg(long)]
    pub codigo: String,
    #[arg(long)]
    pub nombre: String,
    #[arg(long, default_value = "")]
    pub descripcion: String,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub inicio: NaiveDate,
    /// Estimated end date (YYYY-MM-DD)
    #[arg(long)]
    pub fin: NaiveDate,
    #[arg(long, value_enum, default_value_t = ModeArg::PorItems)]
    pub modo: ModeArg,
    #[arg(long, value_enum, default_value_t = PriorityArg::Media)]
    pub prioridad: PriorityArg,
    #[arg(long)]
    pub categoria: Option<String>,
    /// Assigned budget
    #[arg(long, default_value = "0")]
    pub presupuesto: Decimal,
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item to a project
    Add(ItemAddArgs),
    /// Update an item
    Update(ItemUpdateArgs),
    /// Remove a pendiente item
    Remove {
        /// Project ID or codigo
        project: String,
        /// Item number
        numero: u32,
    },
    /// List items with gate state
    List {
        /// Project ID or codigo
        project: String,
    },
}

#[derive(Args)]
pub struct ItemAddArgs {
    /// Project ID or codigo
    pub project: String,
    #[arg(long)]
    pub nombre: String,
    #[arg(long)]
    pub responsable: String,
    /// Planned budget
    #[arg(long)]
    pub planificado: Decimal,
    /// Executed budget
    #[arg(long, default_value = "0")]
    pub ejecutado: Decimal,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub inicio: NaiveDate,
    /// Duration in days
    #[arg(long)]
    pub duracion: u32,
    #[arg(long)]
    pub descripcion: Option<String>,
    /// Provider; implies the item requires one
    #[arg(long)]
    pub proveedor: Option<String>,
    /// Item number this item depends on
    #[arg(long, value_name = "NUMERO")]
    pub depende_de: Option<u32>,
}

#[derive(Args)]
pub struct ItemUpdateArgs {
    /// Project ID or codigo
    pub project: String,
    /// Item number
    pub numero: u32,
    #[arg(long, value_enum)]
    pub estado: Option<StateArg>,
    /// Progress percentage (0-100)
    #[arg(long)]
    pub avance: Option<u8>,
    #[arg(long)]
    pub ejecutado: Option<Decimal>,
    #[arg(long)]
    pub planificado: Option<Decimal>,
    #[arg(long)]
    pub nombre: Option<String>,
    #[arg(long)]
    pub responsable: Option<String>,
    #[arg(long)]
    pub descripcion: Option<String>,
    #[arg(long)]
    pub proveedor: Option<String>,
    #[arg(long)]
    pub requiere_proveedor: Option<bool>,
    #[arg(long)]
    pub inicio: Option<NaiveDate>,
    #[arg(long)]
    pub duracion: Option<u32>,
    /// Item number this item depends on
    #[arg(long, value_name = "NUMERO", conflicts_with = "sin_dependencia")]
    pub depende_de: Option<u32>,
    /// Drop the dependency
    #[arg(long)]
    pub sin_dependencia: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Global,
    #[value(name = "por_items")]
    PorItems,
}

impl From<ModeArg> for BudgetMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Global => BudgetMode::Global,
            ModeArg::PorItems => BudgetMode::PorItems,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    Baja,
    Media,
    Alta,
    Critica,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Baja => Priority::Baja,
            PriorityArg::Media => Priority::Media,
            PriorityArg::Alta => Priority::Alta,
            PriorityArg::Critica => Priority::Critica,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StateArg {
    Pendiente,
    #[value(name = "en_proceso")]
    EnProceso,
    Completado,
    Bloqueado,
}

impl From<StateArg> for ItemState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Pendiente => ItemState::Pendiente,
            StateArg::EnProceso => ItemState::EnProceso,
            StateArg::Completado => ItemState::Completado,
            StateArg::Bloqueado => ItemState::Bloqueado,
        }
    }
}
