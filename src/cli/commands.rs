use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "nd", about = concat!("notedeck v", env!("CARGO_PKG_VERSION"), " - arrange content units into an outline"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different deck directory
    #[arg(short = 'C', long = "deck-dir", global = true)]
    pub deck_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deck in the current directory
    Init(InitArgs),
    /// Show the active project's outline
    Show,
    /// Validate the active project's outline
    Check,
    /// Search sections, subsections and units by regex
    Search(SearchArgs),
    /// Section management
    Section(SectionCmd),
    /// Subsection management
    Subsection(SubsectionCmd),
    /// Add or remove units
    Unit(UnitCmd),
    /// Stage units before placing them in the outline
    Playground(PlaygroundCmd),
    /// Select units (click, or shift-click with --extend)
    Select(SelectArgs),
    /// Drop the dragged item (ACTIVE) over another (OVER)
    Mv(MvArgs),
    /// Encode or decode drag tokens
    Token(TokenCmd),
    /// Project management
    Project(ProjectCmd),
    /// Export the active project as a TeX document
    Export(ExportArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Deck name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Create and activate an initial project
    #[arg(long)]
    pub project: Option<String>,
    /// Reinitialize even if deck/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern
    pub pattern: String,
}

// ---------------------------------------------------------------------------
// Container management
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SectionCmd {
    #[command(subcommand)]
    pub action: SectionAction,
}

#[derive(Subcommand)]
pub enum SectionAction {
    /// Append a new section
    Add(NameArg),
    /// Rename a section
    Rename(RenameArgs),
    /// Remove a section and everything in it
    Rm(IdArg),
}

#[derive(Args)]
pub struct SubsectionCmd {
    #[command(subcommand)]
    pub action: SubsectionAction,
}

#[derive(Subcommand)]
pub enum SubsectionAction {
    /// Append a new subsection to a section
    Add(SubsectionAddArgs),
    /// Rename a subsection
    Rename(RenameArgs),
    /// Remove a subsection and its units
    Rm(IdArg),
}

#[derive(Args)]
pub struct NameArg {
    /// Display name
    pub name: String,
}

#[derive(Args)]
pub struct IdArg {
    /// Container ID
    pub id: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Container ID
    pub id: String,
    /// New display name
    pub name: String,
}

#[derive(Args)]
pub struct SubsectionAddArgs {
    /// Parent section ID
    pub section: String,
    /// Display name
    pub name: String,
}

// ---------------------------------------------------------------------------
// Units and selection
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct UnitCmd {
    #[command(subcommand)]
    pub action: UnitAction,
}

#[derive(Subcommand)]
pub enum UnitAction {
    /// Insert units into a subsection (appended unless --at is given)
    Add(UnitAddArgs),
    /// Remove units from wherever they are
    Rm(UnitRmArgs),
}

#[derive(Args)]
pub struct UnitAddArgs {
    /// Subsection ID
    pub subsection: String,
    /// Unit IDs, in order
    #[arg(required = true)]
    pub ids: Vec<String>,
    /// Insert position (0-indexed)
    #[arg(long)]
    pub at: Option<usize>,
}

#[derive(Args)]
pub struct UnitRmArgs {
    /// Unit IDs
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Unit ID to click
    #[arg(required_unless_present = "clear")]
    pub id: Option<String>,
    /// Extend from the anchor to this unit (shift-click)
    #[arg(long)]
    pub extend: bool,
    /// Clear the selection
    #[arg(long, conflicts_with_all = ["id", "extend"])]
    pub clear: bool,
    /// Select among staged units instead of the outline
    #[arg(long)]
    pub playground: bool,
}

#[derive(Args)]
pub struct PlaygroundCmd {
    #[command(subcommand)]
    pub action: Option<PlaygroundAction>,
}

#[derive(Subcommand)]
pub enum PlaygroundAction {
    /// List staged units (default)
    Ls,
    /// Stage units (already staged ones are skipped)
    Add(StageArgs),
    /// Drop units from the playground
    Rm(StageArgs),
}

#[derive(Args)]
pub struct StageArgs {
    /// Unit IDs, in order
    #[arg(required = true)]
    pub ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

/// What is being dragged
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MoveKind {
    Leaf,
    Section,
    Subsection,
}

#[derive(Args)]
pub struct MvArgs {
    /// Token of the dragged item (`SUB::UNIT` or `playground::UNIT` for
    /// units, the ID for containers)
    pub active: String,
    /// Token of the item under the pointer at drop time
    pub over: String,
    /// Kind of the dragged item
    #[arg(long, value_enum, default_value_t = MoveKind::Leaf)]
    pub kind: MoveKind,
}

#[derive(Args)]
pub struct TokenCmd {
    #[command(subcommand)]
    pub action: TokenAction,
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Build a token from a container ID and optional unit ID
    Encode(TokenEncodeArgs),
    /// Split a token into container ID and unit ID
    Decode(TokenDecodeArgs),
}

#[derive(Args)]
pub struct TokenEncodeArgs {
    /// Container ID
    pub container: String,
    /// Unit ID
    pub unit: Option<String>,
}

#[derive(Args)]
pub struct TokenDecodeArgs {
    /// Token to decode
    pub token: String,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: Option<ProjectAction>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects (default)
    List,
    /// Create a new, empty project
    New(ProjectNameArg),
    /// Rename a project
    Rename(ProjectRenameArgs),
    /// Delete a project and its outline file
    Rm(ProjectNameArg),
    /// Make a project active
    Switch(ProjectNameArg),
}

#[derive(Args)]
pub struct ProjectNameArg {
    /// Project name
    pub name: String,
}

#[derive(Args)]
pub struct ProjectRenameArgs {
    /// Current name
    pub old: String,
    /// New name
    pub new: String,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Output path (default: next free <output_dir>/<project>_vN.tex)
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}
