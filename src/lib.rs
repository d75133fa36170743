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
/*
 * The package's library target exists solely to host this procedural macro; the
 * bot itself lives in the binary. Proc macros must be compiled as their own
 * library crate, so the attribute is invoked as `#[podio::log_cmd]`.
 */
extern crate proc_macro;
use proc_macro::TokenStream;
use quote::quote;
use quote::ToTokens as _;
use syn::spanned::Spanned as _;
use syn::{parse_macro_input, ItemFn};

/**
 * Attribute for command functions that prepends a structured invocation log.
 *
 * The annotated function must be a free function whose first argument is the
 * poise `Context`; a call to `crate::utils::log_invocation!` on that context is
 * inserted as the first statement of the body.
 */
#[proc_macro_attribute]
pub fn log_cmd(_macro_attrs: TokenStream, function: TokenStream) -> TokenStream {
    let mut function = parse_macro_input!(function as ItemFn);

    // The command context must be the first argument:
    let Some(first_arg) = function.sig.inputs.first() else {
        return darling::Error::from(syn::Error::new(
            function.sig.span(),
            "[log_cmd] the command function must take the poise context as its first argument",
        ))
        .write_errors()
        .into();
    };
    let ctx_arg = if let syn::FnArg::Typed(arg) = first_arg {
        arg
    } else {
        // syn::FnArg::Receiver(_)
        return darling::Error::from(syn::Error::new(
            first_arg.span(),
            "[log_cmd] `self` is not a valid command context argument",
        ))
        .write_errors()
        .into();
    };
    let syn::Pat::Ident(ident) = &*ctx_arg.pat else {
        return darling::Error::from(syn::Error::new(
            ctx_arg.pat.span(),
            "[log_cmd] expected a plain identifier for the context argument",
        ))
        .write_errors()
        .into();
    };
    let ctx_ident = ident.ident.clone();

    // Log the invocation (command string, author) before the body runs:
    function.block.stmts.insert(
        0,
        syn::parse(
            quote! {
            crate::utils::log_invocation!(#ctx_ident);
            }
            .into(),
        )
        .unwrap(),
    );

    function.into_token_stream().into()
}
