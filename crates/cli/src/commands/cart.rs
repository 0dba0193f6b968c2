//! Cart commands.

use clap::Subcommand;

use fruity_core::{CartItemId, ProductId, VariantId, format_vnd};
use fruity_storefront::api::CartItem;
use fruity_storefront::{AppError, Result, Storefront};

use crate::output;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a product (its first variant unless one is given)
    Add {
        product_id: ProductId,

        #[arg(short, long)]
        variant: Option<VariantId>,

        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set a line's quantity (clamped to the allowed range)
    Update {
        item_id: CartItemId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { item_id: CartItemId },
    /// Empty the cart
    Clear,
}

pub async fn run(storefront: &Storefront, action: CartAction) -> Result<()> {
    if !storefront.auth().is_logged_in() {
        return Err(AppError::NotAuthenticated);
    }
    let cart = storefront.cart();

    match action {
        CartAction::Show => {
            let items = cart.fetch().await?;
            print_cart(&items);
        }
        CartAction::Add {
            product_id,
            variant,
            quantity,
        } => {
            cart.add_item(product_id, variant, quantity, None).await?;
            output::success("Đã thêm vào giỏ hàng.");
            print_cart(&cart.items().await);
        }
        CartAction::Update { item_id, quantity } => {
            let items = cart.update_quantity(item_id, quantity).await?;
            let bounds = cart.bounds();
            if i64::from(bounds.clamp(quantity)) != quantity {
                output::line(format!(
                    "Số lượng được điều chỉnh trong khoảng {}–{}.",
                    bounds.min, bounds.max
                ));
            }
            print_cart(&items);
        }
        CartAction::Remove { item_id } => {
            let items = cart.remove_item(item_id).await?;
            output::success("Đã xóa sản phẩm khỏi giỏ hàng.");
            print_cart(&items);
        }
        CartAction::Clear => {
            cart.clear().await?;
            output::success("Đã xóa toàn bộ giỏ hàng.");
        }
    }
    Ok(())
}

pub fn print_cart(items: &[CartItem]) {
    if items.is_empty() {
        output::line("Giỏ hàng trống.");
        return;
    }

    for item in items {
        output::line(format!(
            "#{:<6} {:<36} {:>3} × {:>12} = {:>14}",
            item.id,
            item.product.name,
            item.quantity,
            format_vnd(item.product.price),
            format_vnd(item.line_total())
        ));
    }

    let count: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();
    let total = items.iter().map(CartItem::line_total).sum();
    output::blank();
    output::row("Số lượng", count);
    output::money("Tạm tính", total);
}
