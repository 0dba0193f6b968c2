//! Login, registration and password commands.

use secrecy::SecretString;

use fruity_storefront::{Result, Storefront};

use crate::output;

pub async fn login(storefront: &Storefront, email: &str, password: String) -> Result<()> {
    let password = SecretString::from(password);
    let user = storefront.auth().login(email, &password).await?;

    // Fill the cart store so the first command after login sees it
    let count = storefront.cart().fetch().await.map_or(0, |items| items.len());

    match user {
        Some(user) => output::success(&format!("Xin chào, {}!", user.name)),
        None => output::success("Đăng nhập thành công."),
    }
    if count > 0 {
        output::line(format!("Giỏ hàng có {count} sản phẩm."));
    }
    Ok(())
}

pub async fn register(
    storefront: &Storefront,
    name: &str,
    email: &str,
    password: String,
) -> Result<()> {
    let password = SecretString::from(password);
    let message = storefront.auth().register(name, email, &password).await?;
    output::success(&message);
    Ok(())
}

pub async fn logout(storefront: &Storefront) -> Result<()> {
    storefront.logout().await?;
    output::success("Đã đăng xuất.");
    Ok(())
}

pub async fn forgot_password(storefront: &Storefront, email: &str) -> Result<()> {
    let message = storefront.auth().forgot_password(email).await?;
    output::success(&message);
    Ok(())
}

pub async fn reset_password(storefront: &Storefront, token: String, password: String) -> Result<()> {
    let message = storefront
        .auth()
        .reset_password(&SecretString::from(token), &SecretString::from(password))
        .await?;
    output::success(&message);
    output::line("Bạn có thể đăng nhập bằng mật khẩu mới.");
    Ok(())
}
