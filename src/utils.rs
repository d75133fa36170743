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
use crate::Context;
use serde::{Deserialize, Serialize};
use std::fs;

/// Where the ranking database lives on disk.
pub const RANKING_FILE: &str = "data/ranking.json";
/// Directory holding all persistent bot data.
pub const DATA_DIR: &str = "data";
/// The bot's configuration file, created with defaults on first run.
pub const CONFIG_FILE: &str = "config.json";

/* Data structures: */

/**
 * Data structure encapsulating the configuration of the bot.
 *
 * The bot keeps a single global ranking database, so the configuration is
 * global too (one `config.json` next to the binary).
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Roles whose holders may run the mutating `rank-*` commands, matched by
    /// role ID or by name (case-insensitive). An empty list permits everyone.
    pub admin_roles: Vec<String>,
    /// Leaderboard rows shown per page, for both the embed and the image.
    pub per_page: usize,
    /// Default title for the leaderboard embed.
    pub embed_title: String,
    /// Names of the three guild roles `rank-sync-podium` keeps on the top 3,
    /// in gold, silver, bronze order. Roles are created when missing.
    pub podium_roles: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> BotConfig {
        BotConfig {
            admin_roles: Vec::new(),
            per_page: 10,
            embed_title: String::from("RANKING – LEADERBOARD"),
            podium_roles: vec![
                String::from("🥇 Top 1"),
                String::from("🥈 Top 2"),
                String::from("🥉 Top 3"),
            ],
        }
    }
}

/**
 * Macro for logging the usage of a command. Inserted at the top of every
 * command body by the `#[podio::log_cmd]` attribute.
 */
macro_rules! log_invocation {
    ($ctx:ident) => {
        tracing::info!(
            command = %$ctx.invocation_string(),
            author = %$ctx.author().tag(),
            author_id = %$ctx.author().id,
            "command invoked"
        );
    };
}
pub(crate) use log_invocation;

/**
 * Macro for retrieving the guild ID from a Context object.
 */
macro_rules! get_guild_id {
    ($ctx:ident) => {
        $ctx.guild_id()
            .expect("The command was not executed in a guild.")
    };
}
pub(crate) use get_guild_id;

/**
 * Macro guarding the mutating commands: replies and bails out early when the
 * caller holds none of the configured admin roles.
 */
macro_rules! require_authorized {
    ($ctx:ident) => {
        if !crate::utils::caller_is_authorized(&$ctx, &$ctx.data().config).await {
            $ctx.reply("You need one of the configured admin roles to manage the ranking.")
                .await?;
            return Ok(());
        }
    };
}
pub(crate) use require_authorized;

/**
 * Creates the directories and files expected for the bot to function properly.
 */
pub fn init_filesystem() {
    fs::create_dir_all(DATA_DIR).expect("Could not create the data directory.");
    if fs::metadata(CONFIG_FILE).is_err() {
        let json = serde_json::to_string_pretty(&BotConfig::default())
            .expect("Could not serialize the default configuration into JSON.");
        fs::write(CONFIG_FILE, json).expect("Could not create the default configuration file.");
    }
}

/**
 * Loads the bot configuration from its persistent file. `init_filesystem` has
 * created it with defaults beforehand.
 */
pub fn load_config() -> BotConfig {
    let json = fs::read_to_string(CONFIG_FILE).expect("Could not read the configuration file.");
    serde_json::from_str(&json).expect("Could not parse the configuration file as valid JSON.")
}

/**
 * Whether the author of a command holds at least one of the configured admin
 * roles. An empty allow-list authorizes everyone; entries match either the
 * role's ID or its name, case-insensitively.
 */
pub async fn caller_is_authorized(ctx: &Context<'_>, config: &BotConfig) -> bool {
    if config.admin_roles.is_empty() {
        return true;
    }
    let Some(member) = ctx.author_member().await else {
        return false;
    };
    let Some(guild) = ctx.guild() else {
        return false;
    };
    member.roles.iter().any(|role_id| {
        let id = role_id.to_string();
        config.admin_roles.iter().any(|allowed| {
            *allowed == id
                || guild
                    .roles
                    .get(role_id)
                    .is_some_and(|role| role.name.eq_ignore_ascii_case(allowed))
        })
    })
}
