//! Blog and contact commands.

use clap::{Args, Subcommand};

use fruity_storefront::api::ContactMessage;
use fruity_storefront::{Result, Storefront};

use crate::output;

#[derive(Subcommand)]
pub enum PostAction {
    /// List posts
    List {
        #[arg(short, long)]
        page: Option<u32>,

        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Read a post
    Show { slug: String },
}

pub async fn posts(storefront: &Storefront, action: PostAction) -> Result<()> {
    let content = storefront.content();
    match action {
        PostAction::List { page, limit } => {
            let posts = content.posts(page, limit).await?;
            if posts.is_empty() {
                output::line("Chưa có bài viết nào.");
            }
            for post in &posts {
                output::line(format!("{}  ({})", post.title, post.slug));
                if let Some(excerpt) = post.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
                    output::line(format!("    {}", excerpt.trim()));
                }
            }
        }
        PostAction::Show { slug } => {
            let post = content.post(&slug).await?;
            output::line(post.meta_title());
            let byline: Vec<&str> = [
                post.author_name.as_deref(),
                post.category_name.as_deref(),
                post.published_at.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !byline.is_empty() {
                output::line(byline.join(" · "));
            }
            if let Some(views) = post.views {
                output::row("Lượt xem", views);
            }
            output::blank();
            output::line(post.content.as_deref().unwrap_or_default());
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct ContactArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    message: String,
}

pub async fn contact(storefront: &Storefront, args: ContactArgs) -> Result<()> {
    let reply = storefront
        .content()
        .submit_contact(ContactMessage {
            name: args.name,
            email: args.email,
            subject: args.subject,
            message: args.message,
        })
        .await?;
    output::success(&reply);
    Ok(())
}
