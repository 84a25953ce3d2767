/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemEnum, ItemFn};

/// Wraps an async function and logs its wall-clock duration at debug level.
///
/// The annotated function keeps its visibility, generics and signature. The caller's
/// scope must have `tracing::debug` importable as `debug`.
#[proc_macro_attribute]
pub fn measure_duration(_: TokenStream, input: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(input as ItemFn);
    let attrs = &input_fn.attrs;
    let visibility = &input_fn.vis;
    let signature = &input_fn.sig;
    let fn_name = &input_fn.sig.ident;
    let function_body = &input_fn.block;

    let expanded = quote! {
        #(#attrs)*
        #visibility #signature {
            let start_time = std::time::Instant::now();
            let result = async move #function_body.await;
            let elapsed_ms = start_time.elapsed().as_millis();
            debug!("Function: {} | Duration (ms): {}", stringify!(#fn_name), elapsed_ms);
            result
        }
    };

    TokenStream::from(expanded)
}

/// Turns a plain enum into an error type deriving `Debug`, `Serialize` and `thiserror::Error`,
/// displaying every variant as its SCREAMING_SNAKE_CASE name.
#[proc_macro_attribute]
pub fn add_error(_: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ItemEnum);
    let attrs = &input.attrs;
    let visibility = &input.vis;
    let enum_name = &input.ident;

    let variants = input.variants.iter().map(|variant| {
        let variant_screaming_snake_case = convert_to_snake_case(variant.ident.to_string());
        quote! {
            #[error(#variant_screaming_snake_case)]
            #variant,
        }
    });

    let expanded = quote! {
        #(#attrs)*
        #[derive(Debug, Serialize, thiserror::Error)]
        #visibility enum #enum_name {
            #(#variants)*
        }
    };

    TokenStream::from(expanded)
}

fn convert_to_snake_case(input: String) -> String {
    let mut result = String::new();
    let mut last_char_was_upper = false;

    for c in input.chars() {
        if c.is_uppercase() {
            if !last_char_was_upper && !result.is_empty() {
                result.push('_');
            }
            last_char_was_upper = true;
        } else {
            last_char_was_upper = false;
        }
        result.push(c.to_ascii_uppercase());
    }

    result
}
