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
use crate::ranking;
use crate::utils::{get_guild_id, require_authorized};
use crate::{Context, Error};
use serenity::all::{EditRole, GuildId, RoleId, UserId};

/// Page size of the guild member list endpoint.
const MEMBER_PAGE: usize = 1000;

/// Cursor for the next member page: the last member's ID when the page came
/// back full, `None` when the walk is exhausted.
fn next_page_cursor<T>(batch: &[T], id_of: impl Fn(&T) -> UserId) -> Option<UserId> {
    if batch.len() < MEMBER_PAGE {
        return None;
    }
    batch.last().map(id_of)
}

/**
 Ensures a named podium role exists on the guild, creating it when missing.
*/
async fn ensure_role(ctx: &Context<'_>, guild_id: GuildId, name: &str) -> Result<RoleId, Error> {
    let roles = guild_id.roles(ctx.http()).await?;
    if let Some(role) = roles.values().find(|role| role.name == name) {
        return Ok(role.id);
    }
    tracing::info!(role = name, "Creating missing podium role.");
    let role = guild_id
        .create_role(ctx.http(), EditRole::new().name(name))
        .await?;
    Ok(role.id)
}

#[poise::command(
    slash_command,
    rename = "rank-sync-podium",
    guild_only,
    description_localized("en-US", "Sync the podium roles so only the current top 3 hold them."),
    description_localized("es-ES", "Sincroniza los roles de podio con el top 3 actual.")
)]
#[podio::log_cmd]
pub async fn rank_sync_podium(ctx: Context<'_>) -> Result<(), Error> {
    require_authorized!(ctx);
    // Role edits over a full member walk take well over the reply window.
    ctx.defer().await?;
    let guild_id = get_guild_id!(ctx);
    let data = ctx.data();

    let top3 = ranking::get_sorted(&data.store, Some(3)).await;
    let mut slots: Vec<(RoleId, Option<UserId>)> =
        Vec::with_capacity(data.config.podium_roles.len());
    for (i, name) in data.config.podium_roles.iter().enumerate() {
        let role_id = ensure_role(&ctx, guild_id, name).await?;
        let holder = top3
            .get(i)
            .and_then(|entry| entry.user_id.parse::<u64>().ok())
            .filter(|id| *id != 0)
            .map(UserId::new);
        slots.push((role_id, holder));
    }

    let mut granted = 0usize;
    let mut revoked = 0usize;
    // The member list endpoint is paginated; walk it to the end so stale
    // roles beyond the first page get revoked too.
    let mut after: Option<UserId> = None;
    loop {
        let batch = guild_id
            .members(ctx.http(), Some(MEMBER_PAGE as u64), after)
            .await?;
        for member in &batch {
            for (role_id, holder) in &slots {
                let entitled = *holder == Some(member.user.id);
                let has_role = member.roles.contains(role_id);
                if entitled && !has_role {
                    member.add_role(ctx.http(), *role_id).await?;
                    granted += 1;
                } else if !entitled && has_role {
                    member.remove_role(ctx.http(), *role_id).await?;
                    revoked += 1;
                }
            }
        }
        after = next_page_cursor(&batch, |member| member.user.id);
        if after.is_none() {
            break;
        }
    }

    ctx.reply(format!(
        "Podium roles synced: **{granted}** granted, **{revoked}** revoked."
    ))
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_member_pages_continue_the_walk_from_the_last_id() {
        let batch: Vec<u64> = (1..=MEMBER_PAGE as u64).collect();
        assert_eq!(
            next_page_cursor(&batch, |id| UserId::new(*id)),
            Some(UserId::new(MEMBER_PAGE as u64))
        );
    }

    #[test]
    fn short_or_empty_member_pages_end_the_walk() {
        let batch: Vec<u64> = (1..=10).collect();
        assert_eq!(next_page_cursor(&batch, |id| UserId::new(*id)), None);

        let empty: [u64; 0] = [];
        assert_eq!(next_page_cursor(&empty, |id| UserId::new(*id)), None);
    }
}
