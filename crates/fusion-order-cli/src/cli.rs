use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fusion_order_core::models::{OrderStatus, Role};

#[derive(Parser, Debug)]
#[command(
    name = "fusion-order",
    version,
    about = "Browse products, place orders and manage the shop"
)]
pub struct Cli {
    /// API base URL (overrides config and FUSION_ORDER_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long, short)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Create a new account
    Register {
        #[arg(long, short)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the current session
    Whoami,
    /// List products on sale, one category, or search results
    Products {
        #[arg(long, conflicts_with = "search")]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Include unavailable products
        #[arg(long, conflicts_with_all = ["category", "search"])]
        all: bool,
        /// Only print the category list
        #[arg(long)]
        categories: bool,
    },
    /// Show one product
    Product { id: i64 },
    /// Place an order for a product
    Order {
        product_id: i64,
        #[arg(long, short, value_parser = clap::value_parser!(i32).range(1..))]
        quantity: i32,
        /// Contact name
        #[arg(long)]
        name: String,
        /// Contact phone
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        /// Free-form notes for the order
        #[arg(long)]
        requirements: Option<String>,
    },
    /// Admin console
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List all users
    Users,
    /// Create a user account
    UserCreate {
        #[arg(long, short)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Change fields on a user
    UserUpdate {
        id: i64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        enabled: Option<bool>,
        /// Prompt for a new password
        #[arg(long)]
        reset_password: bool,
    },
    UserDelete { id: i64 },
    /// Add a product to the catalog
    ProductCreate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        available: Option<bool>,
    },
    /// Change fields on a product; unset fields keep their current value
    ProductUpdate {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        available: Option<bool>,
    },
    ProductDelete { id: i64 },
    /// List orders, optionally for one product or in one status
    Orders {
        #[arg(long)]
        product_id: Option<i64>,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Show one order
    Order { id: i64 },
    /// Move an order to a new status
    OrderStatus { id: i64, status: OrderStatus },
    OrderDelete { id: i64 },
}
