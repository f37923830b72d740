use chrono::Local;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flooreno_invoice::config::{
    config_dir, load_config, load_session, resolve_output_dir, save_session, PendingInput,
    Session, CONFIG_TEMPLATE,
};
use flooreno_invoice::error::{InvoiceError, Result};
use flooreno_invoice::invoice::{
    format_currency, format_money, generate_invoice, line_total_post_tax, line_total_pre_tax,
    save_invoice, tax_rate_label, InvoiceRequest, PaymentInfo, PaymentMethod, StoreLocation,
};

#[derive(Parser)]
#[command(name = "flooreno-invoice")]
#[command(version, about = "Store invoice builder with PDF output", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.flooreno or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Add a line item to the current invoice
    Add {
        /// Item description or number
        description: String,

        /// Unit price
        #[arg(short, long)]
        price: Decimal,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },

    /// Change the price or quantity of a line item
    Edit {
        /// Item number from 'items' (1-based)
        index: usize,

        /// New unit price
        #[arg(short, long)]
        price: Option<Decimal>,

        /// New quantity
        #[arg(short, long)]
        qty: Option<u32>,
    },

    /// Remove a line item
    Remove {
        /// Item number from 'items' (1-based)
        index: usize,
    },

    /// List the line items on the current invoice
    Items,

    /// Show subtotal, tax and total
    Totals {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove all line items
    Clear,

    /// Show config and current invoice summary
    Status,

    /// Generate the invoice PDF
    Generate {
        /// Customer name
        #[arg(short, long)]
        client: String,

        /// Customer phone number
        #[arg(short = 'n', long)]
        phone: String,

        /// Payment type
        #[arg(short, long, value_enum, ignore_case = true)]
        payment: PaymentMethod,

        /// Cash given by the customer (cash payments)
        #[arg(long)]
        cash: Option<Decimal>,

        /// Store location (default: from config.toml)
        #[arg(short, long, value_enum, ignore_case = true)]
        location: Option<StoreLocation>,

        /// Custom output file path (default: output_dir/Invoice_<client>_<phone>_<timestamp>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Add {
            description,
            price,
            qty,
        } => cmd_add(&cfg_dir, description, price, qty),
        Commands::Edit { index, price, qty } => cmd_edit(&cfg_dir, index, price, qty),
        Commands::Remove { index } => cmd_remove(&cfg_dir, index),
        Commands::Items => cmd_items(&cfg_dir),
        Commands::Totals { json } => cmd_totals(&cfg_dir, json),
        Commands::Clear => cmd_clear(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::Generate {
            client,
            phone,
            payment,
            cash,
            location,
            output,
            open,
        } => {
            let request = InvoiceRequest {
                client_name: client,
                phone,
                location: location.unwrap_or(StoreLocation::Ny),
                payment_method: payment,
                cash_given: cash,
            };
            cmd_generate(&cfg_dir, request, location.is_some(), output, open)
        }
    }
}

fn ensure_initialized(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

/// Convert a 1-based item number from the command line
fn item_index(index: usize, session: &Session) -> Result<usize> {
    index.checked_sub(1).ok_or(InvoiceError::InvalidItemIndex {
        index,
        count: session.items.len(),
    })
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(InvoiceError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized invoice config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set your store details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Add items:               flooreno-invoice add \"Oak Plank\" --price 12.50 --qty 4");
    println!("  3. Generate the invoice:    flooreno-invoice generate --client <name> --phone <phone> --payment cash --cash <amount>");

    Ok(())
}

fn cmd_add(cfg_dir: &Path, description: String, price: Decimal, qty: u32) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let session = load_session(cfg_dir)?;

    let pending = PendingInput {
        name: description,
        price,
        qty,
    };
    let session = session.with_pending(pending).commit_pending()?;
    save_session(cfg_dir, &session)?;

    if let Some(item) = session.items.last() {
        info!(description = item.description(), "item added");
        println!(
            "Added {} x {} @ {}",
            item.quantity(),
            item.description(),
            format_currency(item.unit_price())
        );
    }
    println!(
        "  Total due: {}",
        format_currency(session.totals().amount_due())
    );

    Ok(())
}

fn cmd_edit(cfg_dir: &Path, index: usize, price: Option<Decimal>, qty: Option<u32>) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    if price.is_none() && qty.is_none() {
        return Err(InvoiceError::MissingField("--price or --qty"));
    }

    let session = load_session(cfg_dir)?;
    let idx = item_index(index, &session)?;
    let session = session.edit_item(idx, price, qty)?;
    save_session(cfg_dir, &session)?;

    let item = &session.items[idx];
    println!(
        "Updated item {}: {} x {} @ {}",
        index,
        item.quantity(),
        item.description(),
        format_currency(item.unit_price())
    );
    println!(
        "  Total due: {}",
        format_currency(session.totals().amount_due())
    );

    Ok(())
}

fn cmd_remove(cfg_dir: &Path, index: usize) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let session = load_session(cfg_dir)?;
    let idx = item_index(index, &session)?;
    let removed = session.items.get(idx).map(|i| i.description().to_string());
    let session = session.remove_item(idx)?;
    save_session(cfg_dir, &session)?;

    if let Some(description) = removed {
        println!("Removed {}", description);
    }
    println!(
        "  Total due: {}",
        format_currency(session.totals().amount_due())
    );

    Ok(())
}

fn cmd_clear(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let session = load_session(cfg_dir)?;
    let count = session.items.len();
    save_session(cfg_dir, &session.clear())?;

    println!("Cleared {} item(s)", count);
    Ok(())
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "UNIT PRICE")]
    unit_price: String,
    #[tabled(rename = "QTY")]
    qty: u32,
    #[tabled(rename = "SUBTOTAL")]
    subtotal: String,
    #[tabled(rename = "TOTAL")]
    total: String,
}

/// Append summary rows under a rounded table. All columns but the last are
/// merged into one right-aligned label cell; the value sits in the last column.
fn add_summary_footer(table: &str, rows: &[(String, String)]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < 2 {
        return table.to_string();
    }

    let (label_cols, value_col) = widths.split_at(widths.len() - 1);
    let value_width = value_col[0];
    let label_width = label_cols.iter().sum::<usize>() + label_cols.len() - 1;

    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    let merged: Vec<String> = label_cols.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&format!(
        "├{}┼{}┤\n",
        merged.join("┴"),
        "─".repeat(value_width)
    ));

    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>right$} │\n",
            label,
            value,
            left = label_width - 2,
            right = value_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(label_width),
                "─".repeat(value_width)
            ));
        }
    }

    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(label_width),
        "─".repeat(value_width)
    ));

    out
}

/// List the current line items
fn cmd_items(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let session = load_session(cfg_dir)?;
    if session.items.is_empty() {
        println!("No items added yet.");
        println!("Add one with: flooreno-invoice add <description> --price <price> --qty <qty>");
        return Ok(());
    }

    let totals = session.totals();
    let summary = vec![
        ("Subtotal".to_string(), format_money(totals.subtotal)),
        (format!("Tax ({})", tax_rate_label()), format_money(totals.tax)),
        ("TOTAL".to_string(), format_money(totals.total)),
    ];

    // Pad the last column so the footer values line up with it
    let post_tax: Vec<String> = session
        .items
        .iter()
        .map(|i| format_money(line_total_post_tax(i)))
        .collect();
    let width = post_tax
        .iter()
        .chain(summary.iter().map(|(_, v)| v))
        .map(|v| v.len())
        .max()
        .unwrap_or(0);

    let rows: Vec<ItemRow> = session
        .items
        .iter()
        .zip(post_tax)
        .enumerate()
        .map(|(idx, (item, total))| ItemRow {
            index: idx + 1,
            description: item.description().to_string(),
            unit_price: format_money(item.unit_price()),
            qty: item.quantity(),
            subtotal: format_money(line_total_pre_tax(item)),
            total: format!("{:>width$}", total),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", add_summary_footer(&table, &summary));

    Ok(())
}

#[derive(Serialize)]
struct TotalsJson {
    items: usize,
    subtotal: String,
    tax_rate: String,
    tax: String,
    total: String,
}

fn cmd_totals(cfg_dir: &Path, json: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let session = load_session(cfg_dir)?;
    let totals = session.totals();

    if json {
        let out = TotalsJson {
            items: session.items.len(),
            subtotal: format_money(totals.subtotal),
            tax_rate: tax_rate_label(),
            tax: format_money(totals.tax),
            total: format_money(totals.total),
        };
        let rendered = serde_json::to_string_pretty(&out).map_err(|e| {
            InvoiceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Subtotal:   {}", format_currency(totals.subtotal));
    println!("Tax ({}): {}", tax_rate_label(), format_currency(totals.tax));
    println!("Total:      {}", format_currency(totals.total));

    Ok(())
}

/// Show config and current invoice summary
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);

    println!("Invoice Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Output directory: {}", output_dir.display());
    println!("Store:            {}", config.store.brand);
    println!("Location:         {}", config.store.default_location);
    println!("Items:            {}", session.items.len());
    println!(
        "Total due:        {}",
        format_currency(session.totals().amount_due())
    );

    Ok(())
}

/// Generate the invoice PDF from the current session
fn cmd_generate(
    cfg_dir: &Path,
    mut request: InvoiceRequest,
    location_given: bool,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    if !location_given {
        request.location = config.store.default_location;
    }

    let generated_at = Local::now().naive_local();
    let invoice = generate_invoice(&request, &session.items, &config.store.brand, generated_at)?;

    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    let pdf_path = save_invoice(&invoice, &output_dir, output)?;

    println!("Generated {}", invoice.file_name);
    println!("  Client:   {}", request.client_name.trim());
    println!("  Location: {}", request.location);
    println!("  Items:    {}", session.items.len());
    println!("  Total:    {}", format_currency(invoice.totals.amount_due()));
    if let PaymentInfo::Cash { cash_given, change } = invoice.payment {
        println!("  Cash:     {}", format_currency(cash_given));
        println!("  Change:   {}", format_currency(change));
    } else {
        println!("  Payment:  {}", invoice.payment.method());
    }
    println!("  Saved:    {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}
