//! services/admin_client/src/bin/admin.rs
//!
//! Command-line driver for the inventory admin client. Each subcommand drives
//! the same controllers a graphical front end would.

use admin_client_lib::{
    adapters::{FileSessionPersistence, HttpGateway},
    config::Config,
    error::ClientError,
    ui::{
        AppContext, AuthMode, AuthOutcome, AuthService, DeleteOutcome, FormOutcome, GuardView,
        ProductListView, RouteGuard, SignInForm,
    },
};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use inventory_admin_core::domain::{Identity, ImageAttachment, Product, ProductFilters};
use inventory_admin_core::permissions::MutationAction;
use inventory_admin_core::session::SessionStore;
use inventory_admin_core::validation::ProductField;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "admin", about = "Manage the perishable inventory catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session.
    Login(CredentialArgs),
    /// Create an account and sign in.
    Register(CredentialArgs),
    /// Forget the saved session.
    Logout,
    /// Show the signed-in identity.
    Whoami,
    /// List one page of products.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show a single product.
    Show { id: String },
    /// Create a product.
    Create(ProductArgs),
    /// Update the given fields of a product.
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product.
    Delete {
        id: String,
        /// Confirm the deletion; without it the request is not sent.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "code")]
    product_code: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Manufacture date, YYYY-MM-DD.
    #[arg(long = "manufactured")]
    manufacture_date: Option<String>,
    /// Expiry date, YYYY-MM-DD.
    #[arg(long = "expires")]
    expiry_date: Option<String>,
    #[arg(long)]
    image: Option<PathBuf>,
}

impl ProductArgs {
    fn values(&self) -> [(ProductField, Option<&String>); 6] {
        [
            (ProductField::Name, self.name.as_ref()),
            (ProductField::ProductCode, self.product_code.as_ref()),
            (ProductField::Price, self.price.as_ref()),
            (ProductField::Category, self.category.as_ref()),
            (ProductField::ManufactureDate, self.manufacture_date.as_ref()),
            (ProductField::ExpiryDate, self.expiry_date.as_ref()),
        ]
    }
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(api = %config.api_base_url, "Configuration loaded");

    // --- 2. Build the Shared Context ---
    let session = Arc::new(SessionStore::new());
    let persistence = Arc::new(FileSessionPersistence::new(config.session_file.clone()));
    let gateway = Arc::new(HttpGateway::new(&config.api_base_url, Arc::clone(&session))?);
    let ctx = AppContext::new(config.clone(), gateway, Arc::clone(&session), persistence);

    // --- 3. Restore the Saved Session ---
    let auth = AuthService::new(ctx.clone());
    auth.bootstrap();

    let result = run(cli.command, &ctx, &auth).await;
    if let Some(notification) = ctx.notifications.current() {
        eprintln!("[{:?}] {}", notification.severity, notification.message);
    }
    result
}

async fn run(command: Command, ctx: &AppContext, auth: &AuthService) -> Result<(), ClientError> {
    match command {
        Command::Login(args) => sign_in(auth, AuthMode::SignIn, args).await,
        Command::Register(args) => sign_in(auth, AuthMode::SignUp, args).await,
        Command::Logout => {
            auth.logout();
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let identity = require_identity(ctx)?;
            println!(
                "{} ({:?}) id={}",
                identity.display_name(),
                identity.role,
                identity.id
            );
            Ok(())
        }
        Command::List {
            search,
            category,
            page,
        } => {
            require_identity(ctx)?;
            let view = ProductListView::new(ctx.clone());
            view.fetch_page(ProductFilters {
                search,
                category,
                page,
            })
            .await;
            let state = view.state();
            if let Some(error) = state.error {
                return Err(ClientError::Internal(error));
            }
            print_page(&state.products.items);
            println!(
                "page {} - {} product(s) in total",
                state.products.page_number, state.products.total_count
            );
            Ok(())
        }
        Command::Show { id } => {
            require_identity(ctx)?;
            let product = ctx.api.get_product(&id).await?;
            print_product(&product);
            Ok(())
        }
        Command::Create(fields) => {
            require_identity(ctx)?;
            let view = ProductListView::new(ctx.clone());
            if !view.open_create().await {
                return Err(denied(MutationAction::Create));
            }
            save(&view, &fields).await
        }
        Command::Update { id, fields } => {
            require_identity(ctx)?;
            let view = ProductListView::new(ctx.clone());
            if view.open_edit_by_id(&id).await?.is_none() {
                return Err(denied(MutationAction::Edit));
            }
            save(&view, &fields).await
        }
        Command::Delete { id, yes } => {
            require_identity(ctx)?;
            let view = ProductListView::new(ctx.clone());
            let Some(product) = view.open_delete_by_id(&id).await? else {
                return Err(denied(MutationAction::Delete));
            };
            if !yes {
                view.cancel_delete().await;
                println!("Not deleted; pass --yes to confirm deleting '{}'.", product.name);
                return Ok(());
            }
            match view.confirm_delete().await {
                DeleteOutcome::Deleted { product_id } => {
                    println!("Deleted {product_id}.");
                    Ok(())
                }
                DeleteOutcome::Failed(message) => Err(ClientError::Internal(message)),
                DeleteOutcome::NothingPending => {
                    Err(ClientError::Internal("no deletion was pending".to_string()))
                }
            }
        }
    }
}

async fn sign_in(
    auth: &AuthService,
    mode: AuthMode,
    args: CredentialArgs,
) -> Result<(), ClientError> {
    let mut form = SignInForm::new(mode);
    form.credentials.email = args.email;
    form.credentials.password = args.password;

    match form.submit(auth).await {
        AuthOutcome::SignedIn { identity, .. } => {
            println!("Signed in as {} ({:?}).", identity.display_name(), identity.role);
            Ok(())
        }
        AuthOutcome::Invalid => Err(ClientError::Internal(form.field_errors().to_string())),
        AuthOutcome::Failed(message) => Err(ClientError::Internal(message)),
    }
}

fn denied(action: MutationAction) -> ClientError {
    ClientError::Internal(action.denied_message().to_string())
}

/// Runs the route guard; anonymous callers are sent to sign in.
fn require_identity(ctx: &AppContext) -> Result<Identity, ClientError> {
    match RouteGuard::new(Arc::clone(&ctx.session)).evaluate() {
        GuardView::Protected(identity) => Ok(identity),
        GuardView::Redirect(_) => Err(ClientError::Internal(
            "not signed in; run `admin login` first".to_string(),
        )),
        GuardView::Placeholder => Err(ClientError::Internal(
            "session is still being restored".to_string(),
        )),
    }
}

async fn save(view: &ProductListView, fields: &ProductArgs) -> Result<(), ClientError> {
    let image = match &fields.image {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };
    view.edit_form(|form| {
        for (field, value) in fields.values() {
            if let Some(value) = value {
                form.set_field(field, value.clone());
            }
        }
        if let Some(image) = image {
            form.attach_image(image);
        }
    })
    .await;

    match view.submit_form().await {
        FormOutcome::Saved(product) => {
            println!("Saved:");
            print_product(&product);
            Ok(())
        }
        FormOutcome::Invalid => {
            let errors = view
                .form()
                .await
                .map(|form| form.field_errors().to_string())
                .unwrap_or_default();
            Err(ClientError::Internal(format!("invalid product: {errors}")))
        }
        FormOutcome::Failed(message) => Err(ClientError::Internal(message)),
        FormOutcome::Closed => Err(ClientError::Internal("the form is not open".to_string())),
    }
}

async fn read_image(path: &Path) -> Result<ImageAttachment, ClientError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    let content_type = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(ImageAttachment {
        file_name,
        content_type: content_type.to_string(),
        bytes: Bytes::from(bytes),
    })
}

fn print_page(products: &[Product]) {
    if products.is_empty() {
        println!("No products available.");
        return;
    }
    for product in products {
        println!(
            "{:<26} {:<24} {:<10} {:>9} {:<12} {} -> {} {}",
            product.id,
            product.name,
            product.product_code,
            format!("${:.2}", product.price),
            product.category,
            product.manufacture_date.format("%m/%d/%Y"),
            product.expiry_date.format("%m/%d/%Y"),
            product.status,
        );
    }
}

fn print_product(product: &Product) {
    println!("id:           {}", product.id);
    println!("name:         {}", product.name);
    println!("code:         {}", product.product_code);
    println!("price:        ${:.2}", product.price);
    println!("category:     {}", product.category);
    println!("manufactured: {}", product.manufacture_date);
    println!("expires:      {}", product.expiry_date);
    println!("status:       {}", product.status);
    if let Some(owner) = &product.owner {
        println!("owner:        {}", owner.label());
    }
    if let Some(image) = &product.image {
        println!("image:        {image}");
    }
}
