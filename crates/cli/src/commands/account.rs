//! Wishlist, address book and profile commands.

use clap::{Args, Subcommand};
use secrecy::SecretString;

use fruity_core::{AddressId, ProductId, format_vnd};
use fruity_storefront::api::{Address, AddressInput, ProfileUpdate};
use fruity_storefront::{Result, Storefront};

use crate::output;

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Subcommand)]
pub enum WishlistAction {
    /// List saved products
    Show,
    /// Add the product if absent, remove it if present
    Toggle { product_id: ProductId },
}

pub async fn wishlist(storefront: &Storefront, action: WishlistAction) -> Result<()> {
    let store = storefront.wishlist();
    match action {
        WishlistAction::Show => {
            let items = store.load().await?;
            if items.is_empty() {
                output::line("Danh sách yêu thích trống.");
            }
            for item in &items {
                output::line(format!(
                    "#{:<6} {:<40} {:>14}",
                    item.product.id,
                    item.product.name,
                    format_vnd(item.product.price)
                ));
            }
        }
        WishlistAction::Toggle { product_id } => {
            // Membership is decided against the server list
            store.load().await?;
            if store.toggle(product_id).await? {
                output::success("Đã thêm vào danh sách yêu thích.");
            } else {
                output::success("Đã xóa khỏi danh sách yêu thích.");
            }
        }
    }
    Ok(())
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Subcommand)]
pub enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(AddressArgs),
    /// Make an address the default and use it at checkout
    Default { id: AddressId },
    /// Delete an address
    Delete { id: AddressId },
    /// List provinces, or the districts/wards under a code
    Locations {
        /// Province code to list districts for
        #[arg(long, conflicts_with = "district")]
        province: Option<String>,

        /// District code to list wards for
        #[arg(long)]
        district: Option<String>,
    },
}

#[derive(Args)]
pub struct AddressArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    phone: String,

    /// Street line
    #[arg(long)]
    address: String,

    #[arg(long)]
    province: String,

    #[arg(long)]
    district: String,

    #[arg(long)]
    ward: String,

    #[arg(long)]
    default: bool,
}

impl From<AddressArgs> for AddressInput {
    fn from(args: AddressArgs) -> Self {
        Self {
            name: args.name,
            phone: args.phone,
            address: args.address,
            province_code: args.province,
            district_code: args.district,
            ward_code: args.ward,
            is_default: args.default,
        }
    }
}

pub async fn addresses(storefront: &Storefront, action: AddressAction) -> Result<()> {
    let book = storefront.addresses();
    match action {
        AddressAction::List => {
            let list = book.load().await?;
            let selected = storefront.cart().selected_address_id()?;
            print_addresses(&list, selected);
        }
        AddressAction::Add(args) => {
            let list = book.add(&args.into()).await?;
            output::success("Đã thêm địa chỉ.");
            print_addresses(&list, storefront.cart().selected_address_id()?);
        }
        AddressAction::Default { id } => {
            book.load().await?;
            let list = book.set_default(id).await?;
            storefront.cart().set_selected_address_id(Some(id))?;
            output::success("Đã đặt làm địa chỉ mặc định.");
            print_addresses(&list, Some(id));
        }
        AddressAction::Delete { id } => {
            let list = book.delete(id).await?;
            let cart = storefront.cart();
            if cart.selected_address_id()? == Some(id) {
                cart.set_selected_address_id(None)?;
            }
            output::success("Đã xóa địa chỉ.");
            print_addresses(&list, cart.selected_address_id()?);
        }
        AddressAction::Locations { province, district } => {
            let locations = match (province, district) {
                (Some(code), _) => book.districts(&code).await?,
                (None, Some(code)) => book.wards(&code).await?,
                (None, None) => book.provinces().await?,
            };
            for location in &locations {
                output::line(format!("{:<8} {}", location.code, location.name));
            }
        }
    }
    Ok(())
}

fn print_addresses(list: &[Address], selected: Option<AddressId>) {
    if list.is_empty() {
        output::line("Chưa có địa chỉ nào.");
        return;
    }
    for address in list {
        let mut tags = Vec::new();
        if address.is_default {
            tags.push("mặc định");
        }
        if selected == Some(address.id) {
            tags.push("đang chọn");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        output::line(format!(
            "#{:<5} {} - {}{}",
            address.id, address.name, address.phone, tags
        ));
        output::line(format!("       {}", address.full_address()));
    }
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile
    Show,
    /// Change name, phone or avatar
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        avatar: Option<String>,
    },
    /// Change the password
    Password {
        #[arg(long, env = "FRUITY_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long, env = "FRUITY_NEW_PASSWORD", hide_env_values = true)]
        new: String,

        /// Repeat the new password
        #[arg(long)]
        confirm: String,
    },
}

pub async fn profile(storefront: &Storefront, action: ProfileAction) -> Result<()> {
    let service = storefront.profile();
    match action {
        ProfileAction::Show => {
            let profile = service.get().await?;
            output::line(&profile.name);
            output::row("Email", &profile.email);
            output::row("Điện thoại", profile.phone.as_deref().unwrap_or("-"));
            if let Some(customer_id) = &profile.customer_id {
                output::row("Mã khách hàng", customer_id);
            }
            output::row("Số đơn hàng", profile.order_count);
            output::money("Tổng chi tiêu", profile.total_spent);
            if let Some(last) = &profile.last_order_date {
                output::row("Đơn gần nhất", last);
            }
        }
        ProfileAction::Update {
            name,
            phone,
            avatar,
        } => {
            let profile = service.update(ProfileUpdate { name, avatar, phone }).await?;
            output::success(&format!("Đã cập nhật hồ sơ của {}.", profile.name));
        }
        ProfileAction::Password { current, new, confirm } => {
            let message = service
                .change_password(
                    &SecretString::from(current),
                    &SecretString::from(new),
                    &SecretString::from(confirm),
                )
                .await?;
            output::success(&message);
        }
    }
    Ok(())
}
