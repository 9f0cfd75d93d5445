//! Subcommand handlers. Each prints its result to stdout as pretty JSON.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::broadcast::{self, error::TryRecvError};

use studio_core::{AuthOutcome, KeyValueStore, NewOrder, NewUser, ProfileUpdate, SessionEvent};
use studio_infrastructure::SessionClient;
use studio_security::decode_claims;

use crate::Commands;

#[derive(Args)]
pub struct RegisterArgs {
    pub email: String,
    #[arg(long, env = "STUDIO_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// First and last name, split at the first space
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
}

impl RegisterArgs {
    fn into_new_user(self) -> NewUser {
        let mut user = NewUser::new(&self.email, &self.password, &self.full_name);
        if let Some(phone) = self.phone {
            user = user.with_phone(phone);
        }
        if let Some(company) = self.company {
            user = user.with_company_name(company);
        }
        user
    }
}

#[derive(Args)]
pub struct UpdateProfileArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

impl UpdateProfileArgs {
    fn into_update(self) -> ProfileUpdate {
        let mut update = ProfileUpdate::default();
        if let Some(full_name) = self.full_name {
            update = update.with_full_name(&full_name);
        }
        if let Some(email) = self.email {
            update = update.with_email(email);
        }
        if let Some(phone) = self.phone {
            update = update.with_phone(phone);
        }
        update
    }
}

#[derive(Args)]
pub struct CreateOrderArgs {
    /// Tariff id
    #[arg(long)]
    pub tariff: i64,
    #[arg(long)]
    pub project_name: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub requirements: String,
    /// May be given more than once
    #[arg(long = "reference-link")]
    pub reference_links: Vec<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
    #[arg(long)]
    pub comments: Option<String>,
}

impl CreateOrderArgs {
    pub fn into_new_order(self) -> NewOrder {
        let mut order = NewOrder::new(
            self.tariff,
            self.project_name,
            self.description,
            self.requirements,
        );
        order.reference_links = self.reference_links.into_iter().map(Value::String).collect();
        order.deadline = self.deadline;
        order.comments = self.comments;
        order
    }
}

pub async fn run<S: KeyValueStore + ?Sized>(
    client: &SessionClient<S>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Login {
            identifier,
            password,
        } => {
            let success = auth_result(client.login(&identifier, &password).await)?;
            let has_refresh = !success.tokens.refresh.is_empty();
            print_json(&json!({ "logged_in": true, "has_refresh_token": has_refresh }))
        }
        Commands::Register(args) => {
            let success = auth_result(client.register_and_login(&args.into_new_user()).await)?;
            let logged_in = !success.tokens.access.is_empty();
            print_json(&json!({ "registered": true, "logged_in": logged_in }))
        }
        Commands::Logout => {
            client.logout().await?;
            print_json(&json!({ "logged_in": false }))
        }
        Commands::Status => status(client).await,
        Commands::Profile => print_json(&client.get_user_profile().await?),
        Commands::UpdateProfile(args) => {
            let update = args.into_update();
            if update.is_empty() {
                bail!("Nothing to update: pass --full-name, --email or --phone");
            }
            print_json(&client.update_user_profile(&update).await?)
        }
        Commands::Orders => print_json(&client.get_user_orders().await?),
        Commands::Order { id } => print_json(&client.get_order(id).await?),
        Commands::CreateOrder(args) => {
            print_json(&client.create_order(&args.into_new_order()).await?)
        }
        Commands::Tariffs => print_json(&client.get_tariffs().await?),
        Commands::Tariff { id } => print_json(&client.get_tariff(id).await?),
    }
}

async fn status<S: KeyValueStore + ?Sized>(client: &SessionClient<S>) -> anyhow::Result<()> {
    let session = client.tokens().session().await?;
    let authenticated = client.is_authenticated().await;

    let report = match session.as_ref().map(|pair| decode_claims(&pair.access)) {
        Some(Ok(claims)) => json!({
            "authenticated": authenticated,
            "user_id": claims.user_id,
            "subject": claims.sub,
            "expires_at": claims.expires_at().map(|t| t.to_rfc3339()),
        }),
        Some(Err(e)) => json!({
            "authenticated": false,
            "error": format!("Stored access token is unreadable: {}", e),
        }),
        None => json!({ "authenticated": false }),
    };
    print_json(&report)
}

/// Login/register failures carry the server's JSON body; show it as is.
fn auth_result<T>(outcome: AuthOutcome<T>) -> anyhow::Result<T> {
    match outcome {
        AuthOutcome::Success(value) => Ok(value),
        AuthOutcome::Failure(body) => {
            print_json(body.as_value())?;
            bail!("{}", body)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", text);
    Ok(())
}

/// Drain pending events; true if the session expired during the command.
pub fn session_expired(events: &mut broadcast::Receiver<SessionEvent>) -> bool {
    let mut expired = false;
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Expired) => expired = true,
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    expired
}
