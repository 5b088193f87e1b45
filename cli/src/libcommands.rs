//! Command-line surface of `stockscan`: argument types, value parsers and
//! the mapping from subcommands to backend calls.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use lib_stockscan::{
    run_smoke_checks, BackendAdapter, BackendResult, ContactForm, CredentialsMode, Payload,
    RequestOptions, SmokeReport,
};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;

/// CLI arguments for stockscan.
#[derive(Parser, Debug)]
#[command(
    name = "stockscan",
    author = "ckir",
    version,
    about = "Calls the StockScan Pro backends from the command line.",
    long_about = "Every call goes through one base URL to one of three backends: \
                  WordPress admin-ajax (form posts), the WordPress REST namespace \
                  stock-scanner/v1, or the direct /api/ service. Results are printed as JSON."
)]
pub struct Cli {
    /// Backend base URL, e.g. https://stockscan.example.com
    #[arg(long, global = true, env = "STOCKSCAN_BACKEND_URL", value_hint = ValueHint::Url)]
    pub base_url: Option<String>,

    /// Session cookie (`name=value`) sent with admin-ajax and REST calls.
    #[arg(long, global = true, env = "STOCKSCAN_SESSION_COOKIE", hide_env_values = true)]
    pub session_cookie: Option<String>,

    /// Directory holding config.json and its running-mode overlays.
    #[arg(long, global = true, env = "CONFIGS_LOCATION", value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Also write daily-rotated JSON logs to this directory.
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub log_dir: Option<PathBuf>,

    /// Output minified JSON instead of pretty-printed.
    #[arg(long, global = true)]
    pub minify: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stock quotes and price data.
    #[command(subcommand)]
    Stocks(StocksCommand),
    /// Indices, movers and market statistics.
    #[command(subcommand)]
    Market(MarketCommand),
    #[command(subcommand)]
    Watchlist(WatchlistCommand),
    #[command(subcommand)]
    Portfolio(PortfolioCommand),
    #[command(subcommand)]
    News(NewsCommand),
    /// PayPal orders and subscriptions.
    #[command(subcommand)]
    Payments(PaymentsCommand),
    /// Contact form, newsletter and cancellation feedback.
    #[command(subcommand)]
    Support(SupportCommand),
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
    /// Health, endpoint status and status checks.
    #[command(subcommand)]
    Health(HealthCommand),
    /// POST a form to admin-ajax.
    Ajax(AjaxArgs),
    /// Call an endpoint under /wp-json/stock-scanner/v1/.
    Rest(JsonCallArgs),
    /// Call an endpoint under /api/.
    Api(JsonCallArgs),
    /// Run the direct API smoke checks. Exits 1 unless all of them pass.
    Smoke {
        /// Name for the created status check. Defaults to test_client_<HHMMSS>.
        #[arg(long)]
        client_name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum StocksCommand {
    /// Quote through admin-ajax.
    Quote { symbol: String },
    /// Stock data through REST.
    Data { symbol: String },
    Historical { symbol: String },
    Realtime { symbol: String },
    /// Stock listing through the direct API.
    List {
        /// Query parameter, repeatable and kept in order.
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_field)]
        params: Vec<(String, String)>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MarketCommand {
    Indices,
    Movers,
    Data,
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum WatchlistCommand {
    Add { symbol: String },
    Remove { symbol: String },
    /// Formatted watchlist through admin-ajax.
    Formatted,
    /// Watchlist through REST.
    Show,
    /// Watchlist list through the direct API.
    List,
}

#[derive(Subcommand, Debug)]
pub enum PortfolioCommand {
    Formatted,
    Show,
    List,
}

#[derive(Subcommand, Debug)]
pub enum NewsCommand {
    /// News for a symbol, or general news without one.
    Stock { symbol: Option<String> },
    /// Latest articles through REST.
    Latest {
        #[arg(long)]
        limit: Option<u32>,
    },
    Feed,
}

#[derive(Subcommand, Debug)]
pub enum PaymentsCommand {
    CreateOrder(FieldArgs),
    CaptureOrder(FieldArgs),
    CreateSubscription(FieldArgs),
}

#[derive(Subcommand, Debug)]
pub enum SupportCommand {
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    Newsletter { email: String },
    CancellationFeedback(FieldArgs),
}

#[derive(Subcommand, Debug)]
pub enum AnalyticsCommand {
    Usage,
}

#[derive(Subcommand, Debug)]
pub enum HealthCommand {
    /// Direct API health/.
    Check,
    /// The endpoint-status page.
    EndpointStatus,
    ApiRoot,
    CreateStatus { client_name: String },
    ListStatus,
}

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Form field, repeatable and kept in order.
    #[arg(short = 'f', long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

impl FieldArgs {
    pub fn payload(self) -> Payload {
        self.fields.into_iter().collect()
    }
}

#[derive(Args, Debug)]
pub struct AjaxArgs {
    /// admin-ajax action name.
    pub action: String,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Security token sent as the `nonce` field.
    #[arg(long)]
    pub nonce: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CredentialsArg {
    Include,
    Omit,
}

impl From<CredentialsArg> for CredentialsMode {
    fn from(value: CredentialsArg) -> Self {
        match value {
            CredentialsArg::Include => CredentialsMode::Include,
            CredentialsArg::Omit => CredentialsMode::Omit,
        }
    }
}

#[derive(Args, Debug)]
pub struct JsonCallArgs {
    /// Endpoint path relative to the backend prefix.
    #[arg(default_value = "")]
    pub endpoint: String,

    #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
    pub method: Method,

    /// Extra header, repeatable. Wins over the defaults.
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(HeaderName, HeaderValue)>,

    /// JSON request body.
    #[arg(long, value_parser = parse_json)]
    pub json: Option<Value>,

    /// Override whether session cookies are sent.
    #[arg(long, value_enum)]
    pub credentials: Option<CredentialsArg>,
}

impl JsonCallArgs {
    pub fn options(self) -> RequestOptions {
        let mut options = RequestOptions::new().method(self.method);
        for (name, value) in self.headers {
            options = options.header(name, value);
        }
        if let Some(body) = self.json {
            options = options.json(body);
        }
        if let Some(credentials) = self.credentials {
            options = options.credentials(credentials.into());
        }
        options
    }
}

/// Parses `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parses `Name: value`.
pub fn parse_header(s: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid header: no `:` found in `{s}`"))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| e.to_string())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|e| e.to_string())?;
    Ok((name, value))
}

pub fn parse_method(s: &str) -> Result<Method, String> {
    Method::from_bytes(s.to_ascii_uppercase().as_bytes()).map_err(|e| e.to_string())
}

pub fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| e.to_string())
}

/// What a command produced.
#[derive(Debug)]
pub enum Outcome {
    Value(Value),
    Smoke(SmokeReport),
}

/// Runs `command` against `adapter`.
pub async fn execute(
    adapter: &BackendAdapter,
    command: Command,
    default_client_name: impl FnOnce() -> String,
) -> BackendResult<Outcome> {
    let value = match command {
        Command::Stocks(cmd) => {
            let api = adapter.stocks();
            match cmd {
                StocksCommand::Quote { symbol } => api.get_quote(&symbol).await?,
                StocksCommand::Data { symbol } => api.get_stock_data(&symbol).await?,
                StocksCommand::Historical { symbol } => api.get_historical_data(&symbol).await?,
                StocksCommand::Realtime { symbol } => api.get_realtime_data(&symbol).await?,
                StocksCommand::List { params } => {
                    api.get_stocks(&params.into_iter().collect()).await?
                }
            }
        }
        Command::Market(cmd) => {
            let api = adapter.market();
            match cmd {
                MarketCommand::Indices => api.get_major_indices().await?,
                MarketCommand::Movers => api.get_market_movers().await?,
                MarketCommand::Data => api.get_market_data().await?,
                MarketCommand::Stats => api.get_market_stats().await?,
            }
        }
        Command::Watchlist(cmd) => {
            let api = adapter.watchlist();
            match cmd {
                WatchlistCommand::Add { symbol } => api.add_to_watchlist(&symbol).await?,
                WatchlistCommand::Remove { symbol } => api.remove_from_watchlist(&symbol).await?,
                WatchlistCommand::Formatted => api.get_formatted_watchlist_data().await?,
                WatchlistCommand::Show => api.get_watchlist().await?,
                WatchlistCommand::List => api.get_watchlist_list().await?,
            }
        }
        Command::Portfolio(cmd) => {
            let api = adapter.portfolio();
            match cmd {
                PortfolioCommand::Formatted => api.get_formatted_portfolio_data().await?,
                PortfolioCommand::Show => api.get_portfolio().await?,
                PortfolioCommand::List => api.get_portfolio_list().await?,
            }
        }
        Command::News(cmd) => {
            let api = adapter.news();
            match cmd {
                NewsCommand::Stock { symbol } => api.get_stock_news(symbol.as_deref()).await?,
                NewsCommand::Latest { limit } => api.get_news(limit).await?,
                NewsCommand::Feed => api.get_news_feed().await?,
            }
        }
        Command::Payments(cmd) => {
            let api = adapter.payments();
            match cmd {
                PaymentsCommand::CreateOrder(args) => api.create_paypal_order(&args.payload()).await?,
                PaymentsCommand::CaptureOrder(args) => {
                    api.capture_paypal_order(&args.payload()).await?
                }
                PaymentsCommand::CreateSubscription(args) => {
                    api.create_paypal_subscription(&args.payload()).await?
                }
            }
        }
        Command::Support(cmd) => {
            let api = adapter.support();
            match cmd {
                SupportCommand::Contact {
                    name,
                    email,
                    subject,
                    message,
                } => {
                    let form = ContactForm {
                        name,
                        email,
                        subject,
                        message,
                    };
                    api.submit_contact(&form).await?
                }
                SupportCommand::Newsletter { email } => api.subscribe_newsletter(&email).await?,
                SupportCommand::CancellationFeedback(args) => {
                    api.submit_cancellation_feedback(&args.payload()).await?
                }
            }
        }
        Command::Analytics(AnalyticsCommand::Usage) => adapter.analytics().get_usage_stats().await?,
        Command::Health(cmd) => {
            let api = adapter.health();
            match cmd {
                HealthCommand::Check => api.get_health().await?,
                HealthCommand::EndpointStatus => api.get_endpoint_status().await?,
                HealthCommand::ApiRoot => api.get_api_root().await?,
                HealthCommand::CreateStatus { client_name } => {
                    api.create_status_check(&client_name).await?
                }
                HealthCommand::ListStatus => api.list_status_checks().await?,
            }
        }
        Command::Ajax(args) => {
            adapter
                .legacy_form_call(&args.action, &args.fields.payload(), args.nonce.as_deref())
                .await?
        }
        Command::Rest(args) => {
            let endpoint = args.endpoint.clone();
            adapter.rest_call(&endpoint, args.options()).await?
        }
        Command::Api(args) => {
            let endpoint = args.endpoint.clone();
            adapter.direct_api_call(&endpoint, args.options()).await?
        }
        Command::Smoke { client_name } => {
            let client_name = client_name.unwrap_or_else(default_client_name);
            return Ok(Outcome::Smoke(run_smoke_checks(adapter, &client_name).await));
        }
    };
    Ok(Outcome::Value(value))
}
