//! Storefront CLI

use std::{
    io::{self, Write},
    process::ExitCode,
    rc::Rc,
    str::FromStr,
};

use clap::{Args, Parser, Subcommand};
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;
use tracing::{debug, error};

use storefront::{
    api::{ApiClient, ApiError, NewCustomerRequest, RequestStatus},
    cart::{CartContext, CartError, CartHandle, CartReceipt, CartStore, NewCartLine, ReceiptError},
    catalog::{InMemoryCatalog, fixtures::FixtureError},
    config::{ConfigError, StorefrontConfig},
    format::PriceFormat,
    observability,
    products::{CategoryFilter, ProductId},
};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront catalog and cart CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products
    Products(ProductsArgs),

    /// List product categories
    Categories,

    /// Price a cart of products
    Quote(QuoteArgs),

    /// List services on offer
    Services,

    /// List customer requests
    Requests(RequestsArgs),

    /// Submit a customer request
    Request(NewRequestArgs),

    /// Show a section of site content as JSON
    Content(ContentArgs),
}

#[derive(Debug, Args)]
struct ProductsArgs {
    /// Category name, or "all"
    #[arg(long, default_value = "all")]
    category: CategoryFilter,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Products to add, as ID or IDxQUANTITY
    #[arg(required = true)]
    items: Vec<QuoteItem>,
}

#[derive(Debug, Args)]
struct RequestsArgs {
    /// Only list requests with this status
    #[arg(long, value_enum)]
    status: Option<RequestStatus>,
}

#[derive(Debug, Args)]
struct ContentArgs {
    /// Section name, e.g. hero, about, footer
    section: String,
}

#[derive(Debug, Args)]
struct NewRequestArgs {
    /// Customer name
    #[arg(long)]
    name: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// Requested service
    #[arg(long)]
    service_type: String,

    /// Details of the job
    #[arg(long, default_value = "")]
    description: String,

    /// Where the service is needed
    #[arg(long)]
    location: String,

    /// Mobile money provider (mtn, airtel)
    #[arg(long, default_value = "mtn")]
    payment_method: String,
}

/// One `quote` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QuoteItem {
    product_id: ProductId,
    quantity: u32,
}

impl FromStr for QuoteItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = s.split_once(['x', 'X']).unwrap_or((s, "1"));

        let product_id = id
            .trim()
            .parse::<i64>()
            .map_err(|error| format!("invalid product id in {s:?}: {error}"))?;

        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|error| format!("invalid quantity in {s:?}: {error}"))?;

        Ok(Self {
            product_id: ProductId::new(product_id),
            quantity,
        })
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to load catalog: {0}")]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init_logging(&cli.config.logging) {
        return report(&error);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "command failed");

            report(&error)
        }
    }
}

fn report(error: &dyn std::error::Error) -> ExitCode {
    _ = writeln!(io::stderr(), "error: {error}");

    ExitCode::FAILURE
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.config;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Products(args) => {
            let catalog = load_catalog(&config, &args.category).await?;

            write_products(&mut out, &catalog, &config.pricing.price_format())
        }
        Commands::Categories => {
            let catalog = load_catalog(&config, &CategoryFilter::All).await?;

            for category in catalog.categories() {
                writeln!(out, "{category}")?;
            }

            Ok(())
        }
        Commands::Quote(args) => quote(&mut out, &config, &args.items).await,
        Commands::Services => {
            let services = api_client(&config)?.services().await?;

            let mut builder = Builder::default();
            builder.push_record(["ID", "Service", "Description"]);

            for service in services {
                builder.push_record([service.id.to_string(), service.name, service.description]);
            }

            write_table(&mut out, builder)
        }
        Commands::Requests(args) => {
            let api = api_client(&config)?;

            let requests = match args.status {
                Some(status) => api.requests_by_status(status).await?,
                None => api.requests().await?,
            };

            let mut builder = Builder::default();
            builder.push_record([
                "ID", "Name", "Phone", "Service", "Location", "Payment", "Status", "Date",
            ]);

            for request in requests {
                builder.push_record([
                    request.id.to_string(),
                    request.name,
                    request.phone,
                    request.service_type,
                    request.location,
                    request.payment_method,
                    request.status.to_string(),
                    request.date.unwrap_or_default(),
                ]);
            }

            write_table(&mut out, builder)
        }
        Commands::Request(args) => {
            let request = NewCustomerRequest {
                name: args.name,
                phone: args.phone,
                service_type: args.service_type,
                description: args.description,
                location: args.location,
                payment_method: args.payment_method,
            };

            let created = api_client(&config)?.create_request(&request).await?;

            writeln!(out, "Request {} submitted ({})", created.id, created.status)?;

            Ok(())
        }
        Commands::Content(args) => {
            let content = api_client(&config)?.site_content(&args.section).await?;

            writeln!(out, "{content:#}")?;

            Ok(())
        }
    }
}

fn api_client(config: &StorefrontConfig) -> Result<ApiClient, CliError> {
    Ok(ApiClient::new(config.api_config()?)?)
}

async fn load_catalog(
    config: &StorefrontConfig,
    filter: &CategoryFilter,
) -> Result<InMemoryCatalog, CliError> {
    if let Some(path) = &config.api.catalog_file {
        debug!(path = %path.display(), "loading catalog file");

        let catalog = InMemoryCatalog::load_yaml(path)?;
        let configured = config.pricing.currency()?;

        if let Some(found) = catalog.currency().filter(|found| *found != configured) {
            return Err(ConfigError::CatalogCurrency {
                catalog: found.iso_alpha_code,
                configured: configured.iso_alpha_code,
            }
            .into());
        }

        return Ok(InMemoryCatalog::from_products(
            catalog.by_category(filter).cloned(),
        ));
    }

    Ok(api_client(config)?.catalog(filter).await?)
}

async fn quote(
    out: &mut impl Write,
    config: &StorefrontConfig,
    items: &[QuoteItem],
) -> Result<(), CliError> {
    let catalog = Rc::new(load_catalog(config, &CategoryFilter::All).await?);
    let currency = config.pricing.currency()?;

    let store = CartStore::with_catalog(currency, catalog.clone())
        .with_format(config.pricing.price_format());
    let context = CartContext::provide(CartHandle::new(store));

    write_quote(out, &context, &catalog, items)
}

fn write_products(
    out: &mut impl Write,
    catalog: &InMemoryCatalog,
    format: &PriceFormat,
) -> Result<(), CliError> {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Product", "Category", "Price"]);

    for product in catalog.iter() {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            format.format(&product.price),
        ]);
    }

    write_table(out, builder)
}

fn write_quote(
    out: &mut impl Write,
    context: &CartContext,
    catalog: &InMemoryCatalog,
    items: &[QuoteItem],
) -> Result<(), CliError> {
    let cart = context.cart()?;

    for item in items {
        let line = match catalog.get(item.product_id) {
            Some(product) => NewCartLine::from_product(product, item.quantity),
            None => NewCartLine::new(item.product_id, item.quantity),
        };

        cart.add_to_cart(line)?;
    }

    let receipt = cart.read(CartReceipt::from_store)?;
    let format = cart.read(CartStore::price_format);

    receipt.write_to(&mut *out, &format)?;

    writeln!(out, "{}", receipt.summary().notice())?;

    Ok(())
}

fn write_table(out: &mut impl Write, builder: Builder) -> Result<(), CliError> {
    let mut table = builder.build();
    table.with(Style::modern_rounded());

    writeln!(out, "{table}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use storefront::products::Product;

    use super::*;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_products([Product {
            id: ProductId::new(1),
            name: "Glass Cleaner".to_string(),
            description: String::new(),
            price: Money::from_major(15_000, iso::UGX),
            image: None,
            category: "Household".to_string(),
        }])
    }

    #[test]
    fn quote_items_parse_with_and_without_quantity() -> TestResult {
        assert_eq!(
            "7".parse::<QuoteItem>()?,
            QuoteItem {
                product_id: ProductId::new(7),
                quantity: 1
            }
        );
        assert_eq!(
            "7x3".parse::<QuoteItem>()?,
            QuoteItem {
                product_id: ProductId::new(7),
                quantity: 3
            }
        );
        assert_eq!("7X2".parse::<QuoteItem>()?.quantity, 2);

        Ok(())
    }

    #[test]
    fn malformed_quote_items_are_rejected() {
        assert!("x3".parse::<QuoteItem>().is_err(), "missing id");
        assert!("7x".parse::<QuoteItem>().is_err(), "missing quantity");
        assert!("7x-1".parse::<QuoteItem>().is_err(), "negative quantity");
    }

    #[test]
    fn quote_merges_repeated_products() -> TestResult {
        let catalog = Rc::new(catalog());
        let store = CartStore::with_catalog(iso::UGX, catalog.clone())
            .with_format(PriceFormat::whole_units());
        let context = CartContext::provide(CartHandle::new(store));

        let items: [QuoteItem; 2] = ["1".parse()?, "1x2".parse()?];
        let mut out = Vec::new();

        write_quote(&mut out, &context, &catalog, &items)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Total: UGX 45,000"), "missing total: {text}");
        assert!(
            text.contains("Cart updated! (3 items)"),
            "missing notice: {text}"
        );

        Ok(())
    }

    #[test]
    fn quote_needs_a_cart() -> TestResult {
        let mut out = Vec::new();

        let result = write_quote(&mut out, &CartContext::new(), &catalog(), &["1".parse::<QuoteItem>()?]);

        assert!(matches!(
            result,
            Err(CliError::Cart(CartError::Uninitialized))
        ));

        Ok(())
    }

    fn write_gbp_catalog(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
        let path = dir.join("catalog.yml");

        fs::write(
            &path,
            r#"
products:
  - id: 1
    name: Microfibre Cloth
    price: "2.99 GBP"
    category: Accessories
"#,
        )?;

        Ok(path.to_str().ok_or("non-UTF-8 temp path")?.to_string())
    }

    async fn run_quote(cli: Cli) -> Result<String, CliError> {
        let Commands::Quote(args) = cli.command else {
            panic!("expected the quote command");
        };

        let mut out = Vec::new();
        quote(&mut out, &cli.config, &args.items).await?;

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[tokio::test]
    async fn catalog_file_in_another_currency_is_a_config_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = write_gbp_catalog(dir.path())?;

        let cli = Cli::try_parse_from(["storefront", "--catalog-file", path.as_str(), "quote", "1x2"])?;
        let result = run_quote(cli).await;

        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::CatalogCurrency {
                catalog: "GBP",
                configured: "UGX",
            }))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn catalog_file_quotes_in_configured_currency() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = write_gbp_catalog(dir.path())?;

        let cli = Cli::try_parse_from([
            "storefront",
            "--catalog-file",
            path.as_str(),
            "--currency",
            "GBP",
            "quote",
            "1x2",
        ])?;
        let text = run_quote(cli).await?;

        assert!(text.contains("Total: GBP 5.98"), "missing total: {text}");

        Ok(())
    }

    #[test]
    fn products_table_lists_prices() -> TestResult {
        let mut out = Vec::new();

        write_products(&mut out, &catalog(), &PriceFormat::whole_units())?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Glass Cleaner"), "missing product: {text}");
        assert!(text.contains("UGX 15,000"), "missing price: {text}");

        Ok(())
    }
}
