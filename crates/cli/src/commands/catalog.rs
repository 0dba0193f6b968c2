//! Product, category and home page commands.

use clap::Args;
use rust_decimal::Decimal;

use fruity_core::format_vnd;
use fruity_storefront::api::{Category, Product, ProductFilters, ProductSort, find_category};
use fruity_storefront::{AppError, Result, Storefront};

use crate::output;

#[derive(Args)]
pub struct ProductArgs {
    /// Free-text search
    #[arg(short, long)]
    search: Option<String>,

    /// Category slug
    #[arg(short, long)]
    category: Option<String>,

    #[arg(long)]
    min_price: Option<Decimal>,

    #[arg(long)]
    max_price: Option<Decimal>,

    /// `latest`, `price-asc` or `price-desc`
    #[arg(long)]
    sort: Option<ProductSort>,

    #[arg(short, long)]
    page: Option<u32>,

    #[arg(short, long, default_value_t = 12)]
    limit: u32,

    /// Only featured products
    #[arg(long)]
    featured: bool,

    /// Show the home page sections (featured and newest) instead
    #[arg(long, conflicts_with_all = ["search", "category", "featured"])]
    home: bool,
}

pub async fn products(storefront: &Storefront, args: ProductArgs) -> Result<()> {
    if args.home {
        return home(storefront).await;
    }

    let category_id = match args.category.as_deref() {
        Some(slug) => {
            let tree = storefront.catalog().categories().await?;
            let category = find_category(&tree, slug)
                .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy danh mục: {slug}")))?;
            Some(category.id)
        }
        None => None,
    };

    let filters = ProductFilters {
        search: args.search,
        category_id,
        min_price: args.min_price,
        max_price: args.max_price,
        page: args.page,
        limit: Some(args.limit),
        sort: args.sort,
        featured: args.featured,
    };

    let listing = storefront.product_listing();
    listing.set_filters(filters);
    let page = listing.wait_loaded().await?;

    if page.data.is_empty() {
        output::line("Không tìm thấy sản phẩm nào.");
        return Ok(());
    }
    for product in &page.data {
        print_product_row(product);
    }
    if let Some(pagination) = page.pagination {
        output::blank();
        output::line(format!(
            "Trang {}/{} ({} sản phẩm)",
            pagination.current_page, pagination.total_pages, pagination.total_items
        ));
    }
    Ok(())
}

async fn home(storefront: &Storefront) -> Result<()> {
    let (featured, newest) = tokio::join!(storefront.catalog().featured(), storefront.catalog().newest());

    output::line("Sản phẩm nổi bật");
    for product in &featured? {
        print_product_row(product);
    }
    output::blank();
    output::line("Sản phẩm mới");
    for product in &newest? {
        print_product_row(product);
    }
    Ok(())
}

pub async fn product(storefront: &Storefront, slug: &str) -> Result<()> {
    let catalog = storefront.catalog();
    let product = catalog.product_by_slug(slug).await?;

    let (variants, reviews) = tokio::join!(catalog.variants(product.id), catalog.reviews(product.id));
    let variants = variants?;

    output::line(&product.name);
    output::money("Giá", product.price);
    if let Some(category) = &product.category_name {
        output::row("Danh mục", category);
    }
    if let Some(description) = product.description.as_deref().filter(|d| !d.trim().is_empty()) {
        output::blank();
        output::line(description.trim());
    }

    output::blank();
    output::line("Phân loại");
    for variant in &variants {
        output::line(format!("  #{:<6} {:<30} {}", variant.id, variant.name, format_vnd(variant.price)));
    }

    match reviews {
        Ok(reviews) if !reviews.is_empty() => {
            output::blank();
            output::line(format!("Đánh giá ({})", reviews.len()));
            for review in &reviews {
                output::line(format!(
                    "  {} {}: {}",
                    "★".repeat(usize::from(review.rating.min(5))),
                    review.customer_name,
                    review.content
                ));
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not load reviews"),
    }

    if let Some(category_slug) = category_slug(&catalog.categories().await?, &product) {
        let related = catalog.related(&category_slug, product.id).await?;
        if !related.is_empty() {
            output::blank();
            output::line("Sản phẩm liên quan");
            for product in &related {
                print_product_row(product);
            }
        }
    }
    Ok(())
}

pub async fn categories(storefront: &Storefront) -> Result<()> {
    let tree = storefront.catalog().categories().await?;
    for category in &tree {
        print_category(category, 0);
    }
    Ok(())
}

fn print_category(category: &Category, depth: usize) {
    output::line(format!("{}{} ({})", "  ".repeat(depth), category.name, category.slug));
    for child in &category.children {
        print_category(child, depth + 1);
    }
}

fn print_product_row(product: &Product) {
    output::line(format!(
        "#{:<6} {:<40} {:>14}  {}",
        product.id,
        product.name,
        product.display_price(),
        product.slug
    ));
}

/// Slug of the product's category, looked up by id in the tree.
fn category_slug(tree: &[Category], product: &Product) -> Option<String> {
    let id = product.category_id?;
    let mut stack: Vec<&Category> = tree.iter().collect();
    while let Some(category) = stack.pop() {
        if category.id == id {
            return Some(category.slug.clone());
        }
        stack.extend(category.children.iter());
    }
    None
}
