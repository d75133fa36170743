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
use serenity::all::{GuildId, UserId};

/**
 * What the renderers need to know about a ranked user. Resolution is
 * best-effort: every failure degrades to a placeholder, never an error, so a
 * single stale ID cannot abort a whole leaderboard render.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone)]
pub struct Identity {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl Identity {
    fn unresolved(user_id: &str) -> Identity {
        Identity {
            display_name: fallback_name(user_id),
            avatar_url: None,
        }
    }
}

/// Generic label for users whose member lookup failed.
pub fn fallback_name(user_id: &str) -> String {
    let short: String = user_id.chars().take(4).collect();
    format!("User {short}")
}

/**
 * Resolves a stored user ID to a display name and a PNG avatar URL through the
 * guild member endpoint. Total: lookup failures yield the `User <short-id>`
 * placeholder instead of propagating.
 */
pub async fn resolve_identity(ctx: &Context<'_>, guild_id: GuildId, user_id: &str) -> Identity {
    let Some(uid) = user_id
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(UserId::new)
    else {
        return Identity::unresolved(user_id);
    };

    match guild_id.member(ctx.http(), uid).await {
        Ok(member) => Identity {
            display_name: member.display_name().to_string(),
            // The CDN serves a static PNG for any avatar hash.
            avatar_url: Some(member.face().replace(".webp", ".png")),
        },
        Err(e) => {
            tracing::debug!("could not resolve guild member {user_id}: {e}");
            Identity::unresolved(user_id)
        }
    }
}

/**
 * Downloads an avatar for embedding into the rendered image. Best-effort, like
 * the identity lookup itself.
 */
pub async fn fetch_avatar(client: &reqwest::Client, url: &str) -> Option<Vec<u8>> {
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        tracing::debug!("avatar fetch for {url} answered {}", response.status());
        return None;
    }
    response.bytes().await.ok().map(|bytes| bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_label_uses_the_first_four_id_characters() {
        assert_eq!(fallback_name("123456789"), "User 1234");
        assert_eq!(fallback_name("ab"), "User ab");
    }
}
