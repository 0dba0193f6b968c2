//! Checkout, order, payment and notification commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use fruity_core::{AddressId, OrderId, OrderStatus, PaymentMethod, format_vnd};
use fruity_storefront::api::{Order, OrderSummary};
use fruity_storefront::services::addresses::default_or_first;
use fruity_storefront::services::checkout::{CheckoutOutcome, PaymentReturn, summary};
use fruity_storefront::services::notifications::{NotificationCenter, NotificationSink};
use fruity_storefront::services::order_watcher;
use fruity_storefront::{AppError, Result, Storefront};

use crate::commands::cart::print_cart;
use crate::output;

// =============================================================================
// Checkout
// =============================================================================

#[derive(Args)]
pub struct CheckoutArgs {
    /// Delivery address (defaults to the selected, then the default address)
    #[arg(short, long)]
    address: Option<AddressId>,

    /// `cod` or `momo`
    #[arg(short, long, default_value = "cod")]
    payment: PaymentMethod,

    /// Note for the courier
    #[arg(short, long)]
    notes: Option<String>,

    /// Show the summary without placing the order
    #[arg(long)]
    dry_run: bool,
}

pub async fn checkout(storefront: &Storefront, args: CheckoutArgs) -> Result<()> {
    if !storefront.auth().is_logged_in() {
        return Err(AppError::NotAuthenticated);
    }

    let items = storefront.cart().fetch().await?;
    if items.is_empty() {
        output::line("Giỏ hàng trống.");
        return Ok(());
    }

    let addresses = storefront.addresses().load().await?;
    let wanted = args.address.or(storefront.cart().selected_address_id()?);
    let address = match wanted {
        Some(id) => addresses.iter().find(|a| a.id == id),
        None => default_or_first(&addresses),
    };
    let Some(address) = address else {
        return Err(AppError::Validation(
            "Vui lòng thêm địa chỉ giao hàng trước khi đặt hàng.".to_string(),
        ));
    };

    let checkout = storefront.checkout();
    let quote = checkout.quote_shipping(Some(address), &items).await;
    let totals = summary(&items, &quote);

    print_cart(&items);
    output::blank();
    output::row("Giao đến", format!("{} - {}", address.name, address.full_address()));
    if let Some(name) = quote.option.as_ref().and_then(|o| o.name.as_deref()) {
        output::row("Vận chuyển", name);
    }
    output::money("Phí vận chuyển", totals.shipping_fee);
    if !totals.cod_fee.is_zero() {
        output::money("Phí COD", totals.cod_fee);
    }
    output::money("Tổng cộng", totals.total);

    if args.dry_run {
        return Ok(());
    }

    let outcome = checkout
        .place_order(
            Some(address),
            &items,
            &quote,
            args.payment,
            args.notes.as_deref(),
        )
        .await?;

    output::blank();
    match outcome {
        CheckoutOutcome::Completed { order_id } => {
            output::success(&format!("Đặt hàng thành công! Mã đơn hàng: #{order_id}"));
        }
        CheckoutOutcome::Redirect { order_id, pay_url } => {
            output::success(&format!("Đã tạo đơn hàng #{order_id}."));
            output::line("Mở liên kết sau để thanh toán MoMo:");
            output::line(pay_url);
        }
    }
    Ok(())
}

pub async fn payment_return(
    storefront: &Storefront,
    order_id: Option<&str>,
    result_code: Option<&str>,
    message: Option<&str>,
) -> Result<()> {
    let result = PaymentReturn::from_query(order_id, result_code, message);
    tracing::info!(
        order_id = ?result.order_id,
        success = result.success,
        gateway_message = ?result.message,
        "Payment return"
    );

    if result.success {
        output::success(result.user_message());
    } else {
        output::error(result.user_message());
    }

    if let (Some(id), true) = (&result.order_id, storefront.auth().is_logged_in()) {
        match storefront.orders().load_order_detail(id).await {
            Ok(order) => output::row("Thanh toán", order.payment_status.label()),
            Err(e) => tracing::warn!(error = %e, "Could not load order after payment"),
        }
    }
    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Subcommand)]
pub enum OrderAction {
    /// List my orders
    List {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Show one order with items, history and shipment
    Show { id: OrderId },
    /// Poll order statuses and print changes until Ctrl+C
    Watch,
}

pub async fn run(storefront: &Storefront, action: OrderAction) -> Result<()> {
    let orders = storefront.orders();
    match action {
        OrderAction::List { status } => {
            let mut list = orders.load_my_orders().await?;
            if let Some(status) = status {
                list = orders.filter_by_status(status).await;
            }
            if list.is_empty() {
                output::line("Chưa có đơn hàng nào.");
            }
            for order in &list {
                print_summary_row(order);
            }
        }
        OrderAction::Show { id } => {
            let order = orders.load_order_detail(&id).await?;
            print_order(&order);
        }
        OrderAction::Watch => watch(storefront).await?,
    }
    Ok(())
}

async fn watch(storefront: &Storefront) -> Result<()> {
    if !storefront.auth().is_logged_in() {
        return Err(AppError::NotAuthenticated);
    }

    let interval = storefront.config().order_poll_interval;
    output::line(format!(
        "Đang theo dõi đơn hàng (mỗi {} giây). Nhấn Ctrl+C để dừng.",
        interval.as_secs()
    ));

    let sink = Arc::new(PrintingSink {
        center: storefront.notifications().clone(),
    });
    let handle = order_watcher::spawn(storefront.api().clone(), sink, interval);
    crate::shutdown_signal().await;
    handle.stop().await;
    Ok(())
}

/// Prints each message and keeps it in the notification center.
struct PrintingSink {
    center: NotificationCenter,
}

impl NotificationSink for PrintingSink {
    fn notify(&self, message: String) {
        output::line(format!("🔔 {message}"));
        self.center.notify(message);
    }
}

fn print_summary_row(order: &OrderSummary) {
    output::line(format!(
        "#{:<8} {:<12} {:>14}  {}  {}",
        order.order_number.as_deref().unwrap_or_else(|| order.id.as_str()),
        order.status.label(),
        format_vnd(order.total_amount),
        order.payment_status.label(),
        order.order_date.as_deref().unwrap_or("")
    ));
}

fn print_order(order: &Order) {
    output::line(format!(
        "Đơn hàng #{}",
        order.order_number.as_deref().unwrap_or_else(|| order.id.as_str())
    ));
    output::row("Trạng thái", order.status.label());
    if let Some(method) = order.payment_method {
        output::row("Thanh toán", format!("{} ({})", method.as_str().to_uppercase(), order.payment_status.label()));
    }
    if let Some(name) = &order.customer_name {
        output::row("Người nhận", format!("{name} - {}", order.customer_phone.as_deref().unwrap_or("")));
    }
    if let Some(address) = &order.shipping_address {
        output::row("Địa chỉ", address);
    }
    if let Some(created) = &order.created_at {
        output::row("Ngày đặt", created);
    }

    output::blank();
    for item in &order.items {
        output::line(format!(
            "  {:<36} {:>3} × {:>12} = {:>14}",
            item.product_name,
            item.quantity,
            format_vnd(item.unit_price),
            format_vnd(item.line_total())
        ));
    }
    output::blank();
    output::money("Tạm tính", order.items_total());
    output::money("Phí vận chuyển", order.shipping_fee);
    output::money("Tổng cộng", order.total_amount);

    if let Some(shipment) = &order.shipment {
        output::blank();
        output::line("Vận chuyển");
        if let Some(carrier) = &shipment.carrier_code {
            output::row("Đơn vị", carrier.to_uppercase());
        }
        if let Some(tracking) = &shipment.tracking_number {
            output::row("Mã vận đơn", tracking);
        }
        if let Some(status) = &shipment.status {
            output::row("Tình trạng", status);
        }
        if let Some(eta) = &shipment.estimated_delivery_date {
            output::row("Dự kiến giao", eta);
        }
    }

    if !order.history.is_empty() {
        output::blank();
        output::line("Lịch sử");
        for entry in &order.history {
            output::line(format!(
                "  {:<20} {:<12} {}",
                entry.created_at.as_deref().unwrap_or(""),
                entry.status.map_or("", |s| s.label()),
                entry.notes.as_deref().unwrap_or("")
            ));
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Subcommand)]
pub enum NotificationAction {
    /// List notifications, newest first
    List,
    /// Mark every notification as read
    Read,
}

#[allow(clippy::unnecessary_wraps)]
pub fn notifications(storefront: &Storefront, action: &NotificationAction) -> Result<()> {
    let center = storefront.notifications();
    match action {
        NotificationAction::List => {
            let list = center.list();
            if list.is_empty() {
                output::line("Không có thông báo.");
            }
            for n in &list {
                let marker = if n.read { " " } else { "•" };
                output::line(format!(
                    "{marker} {}  {}",
                    n.created_at.format("%d/%m/%Y %H:%M"),
                    n.message
                ));
            }
            output::blank();
            output::row("Chưa đọc", center.unread_count());
        }
        NotificationAction::Read => {
            center.mark_all_read();
            output::success("Đã đánh dấu tất cả là đã đọc.");
        }
    }
    Ok(())
}
