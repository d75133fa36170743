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
use crate::store::StoreError;
use crate::utils::require_authorized;
use crate::{Context, Error};
use poise::serenity_prelude::{Mentionable, User};

/**
 Replies with the outcome of a point mutation.

 Validation failures (out-of-range amounts, missing user) are reported to the
 caller as a warning reply; anything else bubbles up to the dispatch boundary.
*/
async fn reply_mutation(
    ctx: &Context<'_>,
    user: &User,
    result: Result<i64, StoreError>,
    verb: &str,
) -> Result<(), Error> {
    match result {
        Ok(total) => {
            ctx.reply(format!(
                "{} {}. New total: **{total}** pts.",
                verb,
                user.mention()
            ))
            .await?;
            Ok(())
        }
        Err(
            error @ (StoreError::MissingUserId
            | StoreError::InvalidDelta(_)
            | StoreError::InvalidValue(_)),
        ) => {
            ctx.reply(format!("⚠️ {error}")).await?;
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}

#[poise::command(
    slash_command,
    rename = "rank-add-points",
    guild_only,
    description_localized("en-US", "Add points to a user's ranking score."),
    description_localized("es-ES", "Suma puntos a la puntuación de un usuario.")
)]
#[podio::log_cmd]
pub async fn rank_add_points(
    ctx: Context<'_>,
    #[description = "User whose score to increase."] user: User,
    #[description = "Points to add."]
    #[min = 1]
    #[max = 100_000]
    amount: i64,
) -> Result<(), Error> {
    require_authorized!(ctx);
    let result = ctx
        .data()
        .store
        .add_points(&user.id.to_string(), amount)
        .await;
    reply_mutation(&ctx, &user, result, &format!("Added **{amount}** pts to")).await
}

#[poise::command(
    slash_command,
    rename = "rank-subtract-points",
    guild_only,
    description_localized("en-US", "Subtract points from a user's ranking score."),
    description_localized("es-ES", "Resta puntos a la puntuación de un usuario.")
)]
#[podio::log_cmd]
pub async fn rank_subtract_points(
    ctx: Context<'_>,
    #[description = "User whose score to decrease."] user: User,
    #[description = "Points to subtract."]
    #[min = 1]
    #[max = 100_000]
    amount: i64,
) -> Result<(), Error> {
    require_authorized!(ctx);
    let result = ctx
        .data()
        .store
        .add_points(&user.id.to_string(), amount.saturating_neg())
        .await;
    reply_mutation(
        &ctx,
        &user,
        result,
        &format!("Subtracted **{amount}** pts from"),
    )
    .await
}

#[poise::command(
    slash_command,
    rename = "rank-set",
    guild_only,
    description_localized("en-US", "Set a user's ranking score to an exact value."),
    description_localized("es-ES", "Fija la puntuación de un usuario a un valor exacto.")
)]
#[podio::log_cmd]
pub async fn rank_set(
    ctx: Context<'_>,
    #[description = "User whose score to set."] user: User,
    #[description = "New score value."] value: i64,
) -> Result<(), Error> {
    require_authorized!(ctx);
    let result = ctx
        .data()
        .store
        .set_points(&user.id.to_string(), value)
        .await;
    reply_mutation(&ctx, &user, result, "Set the score of").await
}
