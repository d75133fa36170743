/*
 *  Podio - Discord bot maintaining a point-based ranking for a guild.
 *  Copyright (C) 2025  Podio contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
mod canvas;
mod commands;
mod embed;
mod identity;
mod ranking;
mod store;
mod utils;

use poise::serenity_prelude as serenity;
use std::env;

/* Poise-required data types: */

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;
// User data:
pub struct Data {
    pub store: store::Store,
    pub config: utils::BotConfig,
    pub http: reqwest::Client,
}

async fn ready(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    // Ready (bot is started):
    if let serenity::FullEvent::Ready { data_about_bot, .. } = event {
        tracing::info!(bot = %data_about_bot.user.name, "Connected to Discord.");
        ctx.set_presence(None, serenity::OnlineStatus::Online);
        for g in &data_about_bot.guilds {
            tracing::info!(guild = %g.id, "Serving guild.");
        }
    }

    Ok(())
}

/**
 Dispatch boundary: command failures are logged and answered with a generic
 apology instead of killing the gateway task.
*/
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = ctx.command().name,
                %error,
                "Command failed."
            );
            let _ = ctx
                .say("❌ Something went wrong while handling the command.")
                .await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!(%e, "Error while handling error.");
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let token = env::var("DISCORD_TOKEN")
        .expect("Discord token not provided (in DISCORD_TOKEN environmental variable).");
    let intents = serenity::GatewayIntents::default() | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::export::rank_export(),
                commands::license::license(),
                commands::podium::rank_sync_podium(),
                commands::points::rank_add_points(),
                commands::points::rank_subtract_points(),
                commands::points::rank_set(),
                commands::ranking::ranking(),
                commands::ranking_image::ranking_image(),
                commands::reset::rank_reset(),
                commands::users::rank_add_user(),
                commands::users::rank_remove_user(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(ready(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .expect("Could not register the commands.");

                // Create directories for the persistent data, if necessary:
                utils::init_filesystem();
                let config = utils::load_config();
                let store = store::Store::new(utils::RANKING_FILE);
                store.init().await?;

                Ok(Data {
                    store,
                    config,
                    http: reqwest::Client::new(),
                })
            })
        })
        .build();

    let mut client = serenity::Client::builder(token, intents)
        .framework(framework) // For command handling, using poise.
        .await
        .expect("Could not create the Discord bot client object.");

    client.start().await.expect("The Discord bot crashed.");
}
