//! `shopdesk` command-line driver.
//!
//! # Responsibility
//! - Stand in for the form-based front end: each subcommand loads the data
//!   file, runs one core operation, saves when something changed and prints
//!   the outcome.
//! - Keep all business rules inside `shopdesk_core`.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use shopdesk_core::config::{ENV_CRM_FILE, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_STORE_FILE};
use shopdesk_core::{
    init_logging, parse_entity_id, AppConfig, CrmBook, CustomerUpdate, SaleLine, StoreManager,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "shopdesk", version, about = "CRM and instrument-store record books")]
struct Cli {
    /// Data file to operate on (defaults depend on the book).
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true, env = ENV_LOG_LEVEL)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when omitted.
    #[arg(long, global = true, env = ENV_LOG_DIR)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    book: Book,
}

#[derive(Debug, Subcommand)]
enum Book {
    /// Customer relationship book.
    #[command(subcommand)]
    Crm(CrmCommand),
    /// Musical-instrument store.
    #[command(subcommand)]
    Store(StoreCommand),
}

#[derive(Debug, Args)]
struct ContactArgs {
    first_name: String,
    last_name: String,
    phone: String,
    email: String,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    customer_id: String,
    #[arg(long)]
    first: Option<String>,
    #[arg(long)]
    last: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

impl UpdateArgs {
    fn to_update(&self) -> CustomerUpdate {
        CustomerUpdate {
            first_name: self.first.clone(),
            last_name: self.last.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum CrmCommand {
    AddCustomer(ContactArgs),
    UpdateCustomer(UpdateArgs),
    AddSale {
        customer_id: String,
        product: String,
        quantity: u32,
        total_amount: f64,
    },
    AddSupport {
        customer_id: String,
        subject: String,
        description: String,
    },
    List,
    Report,
    /// Add the demo customer when the book is empty.
    SeedDemo,
}

#[derive(Debug, Subcommand)]
enum StoreCommand {
    AddInstrument {
        name: String,
        stock: u32,
    },
    AddCustomer(ContactArgs),
    UpdateCustomer(UpdateArgs),
    /// Sell one or more `INSTRUMENT_ID:QTY:PRICE` lines.
    Sell {
        customer_id: String,
        #[arg(required = true)]
        lines: Vec<String>,
    },
    AddSupport {
        customer_id: String,
        subject: String,
        message: String,
    },
    Instruments,
    Customers,
    Report,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.log_dir = Some(dir.clone());
    }
    init_logging(&config.logging).context("failed to initialize logging")?;

    match cli.book {
        Book::Crm(command) => {
            let path = cli.data_file.unwrap_or(config.crm_data_file);
            run_crm(command, path)
        }
        Book::Store(command) => {
            let path = cli.data_file.unwrap_or(config.store_data_file);
            run_store(command, path)
        }
    }
}

fn run_crm(command: CrmCommand, path: PathBuf) -> Result<()> {
    let mut book = CrmBook::load_from(&path)
        .with_context(|| format!("failed to load CRM data (set {ENV_CRM_FILE} to relocate)"))?;

    let changed = match command {
        CrmCommand::AddCustomer(contact) => {
            let id = book.add_customer(
                &contact.first_name,
                &contact.last_name,
                &contact.phone,
                &contact.email,
            )?;
            println!("customer added: {id}");
            true
        }
        CrmCommand::UpdateCustomer(args) => {
            let id = parse_entity_id(&args.customer_id)?;
            book.update_customer(id, &args.to_update())?;
            println!("customer updated: {id}");
            true
        }
        CrmCommand::AddSale {
            customer_id,
            product,
            quantity,
            total_amount,
        } => {
            let id = parse_entity_id(&customer_id)?;
            let sale = book.add_sale(id, &product, quantity, total_amount)?;
            println!("sale recorded: {} ({} ₺)", sale.id(), sale.total_amount);
            true
        }
        CrmCommand::AddSupport {
            customer_id,
            subject,
            description,
        } => {
            let id = parse_entity_id(&customer_id)?;
            let request = book.add_support_request(id, &subject, &description)?;
            println!("support request opened: {}", request.id());
            true
        }
        CrmCommand::List => {
            for (index, row) in book.customer_rows().iter().enumerate() {
                println!(
                    "{:>3}  {}  {} {}  {}  {}  sales={} support={}",
                    index + 1,
                    row.id,
                    row.first_name,
                    row.last_name,
                    row.phone,
                    row.email,
                    row.sale_count,
                    row.support_count
                );
            }
            false
        }
        CrmCommand::SeedDemo => match book.seed_demo()? {
            Some(id) => {
                println!("demo customer added: {id}");
                true
            }
            None => {
                println!("book already has customers; nothing seeded");
                false
            }
        },
        CrmCommand::Report => {
            println!("total sales: {} ₺", book.total_sales_amount());
            match book.top_customer_by_sales() {
                Some(customer) => println!(
                    "top customer: {} {} - {} ₺",
                    customer.first_name,
                    customer.last_name,
                    customer.sales_total()
                ),
                None => println!("top customer: no records"),
            }
            false
        }
    };

    if changed {
        book.save_to(&path)?;
        info!(
            "event=cli_command module=cli status=ok book=crm path={}",
            path.display()
        );
    }
    Ok(())
}

fn run_store(command: StoreCommand, path: PathBuf) -> Result<()> {
    let mut manager = StoreManager::load_from(&path)
        .with_context(|| format!("failed to load store data (set {ENV_STORE_FILE} to relocate)"))?;

    let changed = match command {
        StoreCommand::AddInstrument { name, stock } => {
            let instrument = manager.add_instrument(&name, i64::from(stock))?;
            println!("instrument added: {}", instrument.id());
            true
        }
        StoreCommand::AddCustomer(contact) => {
            let customer = manager.add_customer(
                &contact.first_name,
                &contact.last_name,
                &contact.phone,
                &contact.email,
            )?;
            println!("customer added: {}", customer.id());
            true
        }
        StoreCommand::UpdateCustomer(args) => {
            let id = parse_entity_id(&args.customer_id)?;
            manager.update_customer(id, &args.to_update())?;
            println!("customer updated: {id}");
            true
        }
        StoreCommand::Sell { customer_id, lines } => {
            let id = parse_entity_id(&customer_id)?;
            let items = lines
                .iter()
                .map(|line| parse_sale_line(line))
                .collect::<Result<Vec<_>>>()?;
            let sale = manager.add_sale(id, &items)?;
            println!("sale recorded: {} ({} ₺)", sale.id(), sale.total());
            true
        }
        StoreCommand::AddSupport {
            customer_id,
            subject,
            message,
        } => {
            let id = parse_entity_id(&customer_id)?;
            let request = manager.add_support_request(id, &subject, &message)?;
            println!("support request opened: {}", request.id());
            true
        }
        StoreCommand::Instruments => {
            for instrument in manager.instruments() {
                println!(
                    "{}  {}  stock={}",
                    instrument.id(),
                    instrument.name,
                    instrument.stock()
                );
            }
            false
        }
        StoreCommand::Customers => {
            for customer in manager.customers() {
                println!(
                    "{}  {}  {}  {}",
                    customer.id(),
                    customer.full_name(),
                    customer.phone,
                    customer.email
                );
            }
            false
        }
        StoreCommand::Report => {
            println!("total sales: {} ₺", manager.total_sales_amount());
            match manager.top_customer_by_sales() {
                Some(customer) => println!(
                    "top customer: {} - {} ₺",
                    customer.full_name(),
                    manager.customer_sales_total(customer.id()).unwrap_or(0.0)
                ),
                None => println!("top customer: no records"),
            }
            false
        }
    };

    if changed {
        manager.save_to(&path)?;
        info!(
            "event=cli_command module=cli status=ok book=store path={}",
            path.display()
        );
    }
    Ok(())
}

/// Parses `INSTRUMENT_ID:QTY:PRICE`.
fn parse_sale_line(raw: &str) -> Result<SaleLine> {
    let mut parts = raw.split(':');
    let (Some(id), Some(quantity), Some(price), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(anyhow!("sale line `{raw}` must look like INSTRUMENT_ID:QTY:PRICE"));
    };

    let instrument_id = parse_entity_id(id)?;
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid quantity in `{raw}`"))?;
    let price = price
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid price in `{raw}`"))?;
    Ok(SaleLine::new(instrument_id, quantity, price))
}

#[cfg(test)]
mod tests {
    use super::{parse_sale_line, Cli};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sale_line_reads_three_fields() {
        let line = parse_sale_line("0f8fad5b-d9cb-469f-a165-70867728950e:2:150.5").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, 150.5);
        assert!(parse_sale_line("0f8fad5b-d9cb-469f-a165-70867728950e:2").is_err());
        assert!(parse_sale_line("0f8fad5b-d9cb-469f-a165-70867728950e:x:1").is_err());
    }
}
