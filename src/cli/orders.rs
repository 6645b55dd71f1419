use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use clap::{Args, Subcommand, ValueEnum};
use griya::{
    admin::{AdminReview, AlwaysConfirm, Confirmation, orders_table},
    config::StorefrontConfig,
    invoice::{self, DirectorySink, DocumentRenderer, DocumentSink, TableRenderer, TypstRenderer},
    messaging::LogMessenger,
    orders::{OrderId, OrderStore},
    pricing::format_idr,
    storage::FileStore,
};

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Tabulate persisted orders
    List(ListArgs),

    /// Mark an order as paid and issue the paid invoice
    Verify(VerifyArgs),

    /// Issue a paid invoice again
    Resend(OrderArgs),

    /// Render the document for an order in its current status
    Invoice(InvoiceArgs),

    /// Pending count and revenue
    Summary,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only orders waiting for verification
    #[arg(long, conflicts_with = "history")]
    pending: bool,

    /// Only settled orders
    #[arg(long)]
    history: bool,
}

#[derive(Debug, Args)]
struct VerifyArgs {
    /// Order code, e.g. ORD-482913
    id: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,

    /// Document format
    #[arg(long, value_enum, default_value_t = DocumentFormat::Typst)]
    format: DocumentFormat,
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Order code, e.g. ORD-482913
    id: String,

    /// Document format
    #[arg(long, value_enum, default_value_t = DocumentFormat::Typst)]
    format: DocumentFormat,
}

#[derive(Debug, Args)]
struct InvoiceArgs {
    /// Order code, e.g. ORD-482913
    id: String,

    /// Document format
    #[arg(long, value_enum, default_value_t = DocumentFormat::Typst)]
    format: DocumentFormat,

    /// Write to stdout instead of the output directory
    #[arg(long)]
    stdout: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DocumentFormat {
    /// Typst markup, compile with `typst compile`
    Typst,

    /// Plain-text receipt
    Text,
}

impl DocumentFormat {
    fn renderer(self) -> Arc<dyn DocumentRenderer> {
        match self {
            DocumentFormat::Typst => Arc::new(TypstRenderer),
            DocumentFormat::Text => Arc::new(TableRenderer),
        }
    }
}

/// Asks on stderr and reads the answer from stdin.
#[derive(Debug)]
struct PromptConfirmation;

impl Confirmation for PromptConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr().lock();

        if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();

        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }

        matches!(answer.trim().to_lowercase().as_str(), "y" | "ya" | "yes")
    }
}

struct Context {
    orders: Arc<OrderStore>,
    sink: Arc<DirectorySink>,
}

impl Context {
    fn open(config: &StorefrontConfig) -> Result<Self, String> {
        let storage = FileStore::open(&config.data_dir)
            .map_err(|error| format!("failed to open data directory: {error}"))?;

        Ok(Self {
            orders: Arc::new(OrderStore::new(Arc::new(storage), config.keys.orders.clone())),
            sink: Arc::new(DirectorySink::new(&config.output_dir)),
        })
    }

    fn review(&self, format: DocumentFormat) -> AdminReview {
        AdminReview::new(
            Arc::clone(&self.orders),
            format.renderer(),
            self.sink.clone(),
            Arc::new(LogMessenger),
        )
    }
}

pub(crate) fn run(command: OrdersCommand, config: &StorefrontConfig) -> Result<(), String> {
    let context = Context::open(config)?;
    let mut out = io::stdout().lock();

    match command.command {
        OrdersSubcommand::List(args) => list(&context, &args, &mut out),
        OrdersSubcommand::Verify(args) => verify(&context, &args, &mut out),
        OrdersSubcommand::Resend(args) => resend(&context, &args, &mut out),
        OrdersSubcommand::Invoice(args) => render_invoice(&context, &args, &mut out),
        OrdersSubcommand::Summary => summary(&context, &mut out),
    }
}

fn list(context: &Context, args: &ListArgs, out: &mut impl Write) -> Result<(), String> {
    let review = context.review(DocumentFormat::Text);

    let result = if args.pending {
        writeln!(out, "{}", orders_table(&review.pending()))
    } else if args.history {
        writeln!(out, "{}", orders_table(&review.history()))
    } else {
        return review
            .write_table(out)
            .map_err(|error| format!("failed to write orders: {error}"));
    };

    result.map_err(|error| format!("failed to write orders: {error}"))
}

fn verify(context: &Context, args: &VerifyArgs, out: &mut impl Write) -> Result<(), String> {
    let review = context.review(args.format);
    let confirmation: &dyn Confirmation = if args.yes {
        &AlwaysConfirm
    } else {
        &PromptConfirmation
    };

    let verification = review
        .verify(&OrderId::from(args.id.as_str()), confirmation)
        .map_err(|error| error.to_string())?;

    let document = verification.document.map_or_else(
        || "(tanpa dokumen)".to_string(),
        |document| context.sink.dir().join(document.file_name).display().to_string(),
    );

    writeln!(out, "order: {}", verification.order.id)
        .and_then(|()| writeln!(out, "status: {}", verification.order.status))
        .and_then(|()| writeln!(out, "document: {document}"))
        .map_err(|error| format!("failed to write: {error}"))
}

fn resend(context: &Context, args: &OrderArgs, out: &mut impl Write) -> Result<(), String> {
    let document = context
        .review(args.format)
        .resend_invoice(&OrderId::from(args.id.as_str()))
        .map_err(|error| error.to_string())?;

    writeln!(out, "document: {}", context.sink.dir().join(document.file_name).display())
        .map_err(|error| format!("failed to write: {error}"))
}

fn render_invoice(context: &Context, args: &InvoiceArgs, out: &mut impl Write) -> Result<(), String> {
    let id = OrderId::from(args.id.as_str());
    let order = context
        .orders
        .find(&id)
        .ok_or_else(|| format!("Pesanan #{id} tidak ditemukan."))?;

    let document = invoice::generate(&order, args.format.renderer().as_ref())
        .map_err(|error| error.to_string())?;

    if args.stdout {
        return out
            .write_all(&document.bytes)
            .map_err(|error| format!("failed to write: {error}"));
    }

    context.sink.save(&document).map_err(|error| error.to_string())?;

    writeln!(out, "document: {}", context.sink.dir().join(document.file_name).display())
        .map_err(|error| format!("failed to write: {error}"))
}

fn summary(context: &Context, out: &mut impl Write) -> Result<(), String> {
    let summary = context
        .review(DocumentFormat::Text)
        .summary()
        .map_err(|error| error.to_string())?;

    writeln!(out, "pending: {}", summary.pending)
        .and_then(|()| writeln!(out, "orders: {}", summary.orders))
        .and_then(|()| writeln!(out, "revenue: {}", format_idr(summary.revenue)))
        .map_err(|error| format!("failed to write: {error}"))
}
