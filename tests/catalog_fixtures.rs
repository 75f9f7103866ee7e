//! Integration tests for YAML catalogs

use std::{fs, path::PathBuf, rc::Rc};

use rusty_money::{Money, iso::UGX};
use testresult::TestResult;

use storefront::prelude::*;

fn bundled_catalog() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("products")
        .join("cleaning.yml")
}

#[test]
fn bundled_catalog_loads_in_listing_order() -> TestResult {
    let catalog = InMemoryCatalog::load_yaml(bundled_catalog())?;

    assert_eq!(catalog.len(), 8);
    assert_eq!(
        catalog.categories(),
        ["Household", "Automotive", "Accessories"]
    );

    let automotive: Vec<i64> = catalog
        .by_category(&CategoryFilter::Named("Automotive".to_string()))
        .map(|product| product.id.get())
        .collect();

    assert_eq!(automotive, [2, 5, 8]);

    Ok(())
}

#[test]
fn cart_prices_from_loaded_catalog() -> TestResult {
    let catalog = Rc::new(InMemoryCatalog::load_yaml(bundled_catalog())?);
    let mut cart = CartStore::with_catalog(UGX, catalog.clone())
        .with_format(PriceFormat::whole_units());

    let carpet = catalog.get(ProductId::new(4)).ok_or("missing product 4")?;

    cart.add_to_cart(NewCartLine::from_product(carpet, 2))?;
    cart.add_to_cart(NewCartLine::new(ProductId::new(3), 1))?;

    let total = cart.cart_total()?;

    assert_eq!(total, Money::from_major(38_000, UGX));
    assert_eq!(cart.format_price(&total), "UGX 38,000");

    Ok(())
}

#[test]
fn catalog_file_on_disk_is_parsed() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalog.yml");

    fs::write(
        &path,
        r#"
products:
  - id: 10
    name: Window Squeegee
    price: "4500.50 UGX"
    category: Accessories
"#,
    )?;

    let catalog = InMemoryCatalog::load_yaml(&path)?;
    let product = catalog.product(ProductId::new(10))?;

    assert_eq!(product.price, Money::from_minor(4_501, UGX));
    assert_eq!(product.description, "");

    Ok(())
}

#[test]
fn missing_catalog_file_is_an_io_error() -> TestResult {
    let dir = tempfile::tempdir()?;

    let result = InMemoryCatalog::load_yaml(dir.path().join("missing.yml"));

    assert!(matches!(result, Err(FixtureError::Io(_))));

    Ok(())
}

#[test]
fn mixed_currency_catalog_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalog.yml");

    fs::write(
        &path,
        r#"
products:
  - id: 1
    name: Glass Cleaner
    price: "8000 UGX"
    category: Household
  - id: 2
    name: Imported Wax
    price: "12.00 USD"
    category: Automotive
"#,
    )?;

    let result = InMemoryCatalog::load_yaml(&path);

    assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

    Ok(())
}
