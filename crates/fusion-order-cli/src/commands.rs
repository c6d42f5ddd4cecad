//! Command handlers. Each one is a thin caller of the API client.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use fusion_order_core::models::{
    categories, Order, OrderQuery, OrderSubmission, Product, ProductInput, ProductQuery,
    RegisterRequest, User, UserUpdate,
};
use fusion_order_core::auth::SessionData;
use fusion_order_core::{ApiClient, Config, CredentialStore};

use crate::cli::{AdminCommand, Command};
use crate::format::{format_datetime, format_optional, format_price, truncate_string};

/// Width of the name column in tables
const NAME_WIDTH: usize = 28;

pub async fn execute(
    client: &ApiClient,
    config: &mut Config,
    json: bool,
    command: Command,
) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let username = match username.or_else(|| config.last_username.clone()) {
                Some(name) => name,
                None => prompt("Username: ")?,
            };
            let password = match password {
                Some(p) => p,
                None => {
                    rpassword::prompt_password("Password: ").context("Failed to read password")?
                }
            };

            let auth = client.login(&username, &password).await?;
            config
                .remember_username(&username)
                .context("Failed to save config")?;

            println!("Logged in. Welcome, {}!", auth.display_name());
            match auth.role {
                Some(role) if role.is_admin() || role.can_manage_products() => {
                    println!(
                        "Role {}: the admin console is available via `fusion-order admin`.",
                        role
                    );
                }
                _ => println!("Browse the catalog with `fusion-order products`."),
            }
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out.");
        }
        Command::Register { username, email, phone } => {
            let password = prompt_new_password()?;
            let user = client
                .register(&RegisterRequest {
                    username,
                    password,
                    email,
                    phone,
                    role: None,
                })
                .await?;
            println!("Registered {}. Sign in with `fusion-order login`.", user.username);
        }
        Command::Whoami => {
            let session = client
                .credentials()
                .session()
                .context("Failed to read the stored session")?;
            println!("{}", session_summary(client.base_url(), session.as_ref()));
        }
        Command::Products {
            category,
            search,
            all,
            categories: only_categories,
        } => {
            let products = match search.filter(|s| !s.trim().is_empty()) {
                Some(keyword) => client.search_products(keyword.trim()).await?,
                None if all => client.list_products(&ProductQuery::default()).await?,
                None => {
                    client
                        .list_products(&ProductQuery::catalog(category.as_deref()))
                        .await?
                }
            };
            if only_categories {
                emit(json, &categories(&products), |cats| cats.join("\n"))?;
            } else {
                emit(json, &products, |p| product_table(p))?;
            }
        }
        Command::Product { id } => {
            let product = client.get_product(id).await?;
            emit(json, &product, product_detail)?;
        }
        Command::Order {
            product_id,
            quantity,
            name,
            phone,
            email,
            requirements,
        } => {
            let mut submission = OrderSubmission::new(product_id, quantity, name, phone);
            submission.contact_email = email;
            submission.requirements = requirements;
            let order = client.submit_order(&submission).await?;
            if json {
                emit(json, &order, |_| String::new())?;
            } else {
                println!("Order #{} submitted. We will contact you shortly.", order.id);
            }
        }
        Command::Admin(admin) => {
            debug!(?admin, "Running admin command");
            execute_admin(client, json, admin).await?
        }
    }
    Ok(())
}

async fn execute_admin(client: &ApiClient, json: bool, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Users => {
            let users = client.list_users().await?;
            emit(json, &users, |u| user_table(u))?;
        }
        AdminCommand::UserCreate {
            username,
            email,
            phone,
            role,
        } => {
            let password = prompt_new_password()?;
            let user = client
                .register(&RegisterRequest {
                    username,
                    password,
                    email,
                    phone,
                    role,
                })
                .await?;
            println!("Created user #{} ({}).", user.id, user.username);
        }
        AdminCommand::UserUpdate {
            id,
            username,
            email,
            phone,
            role,
            enabled,
            reset_password,
        } => {
            let password = if reset_password {
                Some(prompt_new_password()?)
            } else {
                None
            };
            let update = UserUpdate {
                username,
                password,
                email,
                phone,
                role,
                enabled,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to update: pass at least one field");
            }
            let user = client.update_user(id, &update).await?;
            emit(json, &user, |u| user_table(std::slice::from_ref(u)))?;
        }
        AdminCommand::UserDelete { id } => {
            client.delete_user(id).await?;
            println!("Deleted user #{}.", id);
        }
        AdminCommand::ProductCreate {
            name,
            category,
            price,
            description,
            image_url,
            available,
        } => {
            let input = ProductInput {
                name,
                category,
                price,
                description,
                image_url,
                available,
            };
            let product = client.create_product(&input).await?;
            emit(json, &product, product_detail)?;
        }
        AdminCommand::ProductUpdate {
            id,
            name,
            category,
            price,
            description,
            image_url,
            available,
        } => {
            let current = client.get_product(id).await?;
            let mut input = ProductInput::from(&current);
            if let Some(name) = name {
                input.name = name;
            }
            if let Some(category) = category {
                input.category = category;
            }
            if let Some(price) = price {
                input.price = price;
            }
            if description.is_some() {
                input.description = description;
            }
            if image_url.is_some() {
                input.image_url = image_url;
            }
            if available.is_some() {
                input.available = available;
            }
            let product = client.update_product(id, &input).await?;
            emit(json, &product, product_detail)?;
        }
        AdminCommand::ProductDelete { id } => {
            client.delete_product(id).await?;
            println!("Deleted product #{}.", id);
        }
        AdminCommand::Orders { product_id, status } => {
            let orders = client.list_orders(&OrderQuery { product_id, status }).await?;
            emit(json, &orders, |o| order_table(o))?;
        }
        AdminCommand::Order { id } => {
            let order = client.get_order(id).await?;
            emit(json, &order, order_detail)?;
        }
        AdminCommand::OrderStatus { id, status } => {
            let order = client.update_order_status(id, status).await?;
            println!("Order #{} is now {}.", order.id, order.status);
        }
        AdminCommand::OrderDelete { id } => {
            client.delete_order(id).await?;
            println!("Deleted order #{}.", id);
        }
    }
    Ok(())
}

/// Print `value` as JSON or through the text renderer
fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn prompt_new_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let confirm =
        rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

fn product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }
    let mut out = format!(
        "{:>5}  {:<width$}  {:<14}  {:>10}  {}\n",
        "ID",
        "NAME",
        "CATEGORY",
        "PRICE",
        "STATUS",
        width = NAME_WIDTH
    );
    for p in products {
        out.push_str(&format!(
            "{:>5}  {:<width$}  {:<14}  {:>10}  {}\n",
            p.id,
            truncate_string(&p.name, NAME_WIDTH),
            truncate_string(&p.category, 14),
            format_price(p.price),
            p.availability_display(),
            width = NAME_WIDTH
        ));
    }
    out.trim_end().to_string()
}

/// Who the stored session belongs to. User details only show while a token exists.
fn session_summary(server: &str, session: Option<&SessionData>) -> String {
    let mut out = format!("Server:   {}\n", server);
    match session {
        Some(s) => {
            out.push_str(&format!("User:     {}\n", format_optional(&s.username, "-")));
            let role = s.role.map(|r| r.to_string());
            out.push_str(&format!("Role:     {}\n", format_optional(&role, "-")));
            out.push_str(&format!("Session:  signed in {} ago", s.age_display()));
        }
        None => out.push_str("Session:  signed out"),
    }
    out
}

fn product_detail(p: &Product) -> String {
    format!(
        "#{} {}\nCategory:    {}\nPrice:       {}\nStatus:      {}\n\
         Description: {}\nImage:       {}\nListed:      {}",
        p.id,
        p.name,
        p.category,
        format_price(p.price),
        p.availability_display(),
        format_optional(&p.description, "-"),
        format_optional(&p.image_url, "-"),
        format_datetime(p.created_at),
    )
}

fn order_table(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders found.".to_string();
    }
    let mut out = format!(
        "{:>5}  {:<width$}  {:>5}  {:<16}  {:<11}  {}\n",
        "ID",
        "PRODUCT",
        "QTY",
        "CONTACT",
        "STATUS",
        "CREATED",
        width = NAME_WIDTH
    );
    for o in orders {
        out.push_str(&format!(
            "{:>5}  {:<width$}  {:>5}  {:<16}  {:<11}  {}\n",
            o.id,
            truncate_string(&format_optional(&o.product_name, "-"), NAME_WIDTH),
            o.quantity,
            truncate_string(&o.contact_name, 16),
            o.status.to_string(),
            format_datetime(o.created_at),
            width = NAME_WIDTH
        ));
    }
    out.trim_end().to_string()
}

fn order_detail(o: &Order) -> String {
    format!(
        "Order #{} ({})\nProduct:      {}\nQuantity:     {}\nContact:      {} / {}\n\
         Email:        {}\nRequirements: {}\nCreated:      {}",
        o.id,
        o.status,
        format_optional(&o.product_name, "-"),
        o.quantity,
        o.contact_name,
        o.contact_phone,
        format_optional(&o.contact_email, "-"),
        format_optional(&o.requirements, "-"),
        format_datetime(o.created_at),
    )
}

fn user_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }
    let mut out = format!(
        "{:>5}  {:<20}  {:<28}  {:<15}  {:<8}  {}\n",
        "ID", "USERNAME", "EMAIL", "PHONE", "ROLE", "ENABLED"
    );
    for u in users {
        out.push_str(&format!(
            "{:>5}  {:<20}  {:<28}  {:<15}  {:<8}  {}\n",
            u.id,
            truncate_string(&u.username, 20),
            truncate_string(&format_optional(&u.email, "-"), 28),
            format_optional(&u.phone, "-"),
            u.role.to_string(),
            if u.is_enabled() { "yes" } else { "no" },
        ));
    }
    out.trim_end().to_string()
}
