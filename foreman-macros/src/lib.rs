use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Test attribute that installs the process-wide tracing subscriber before
/// the body runs, so `RUST_LOG` works in tests the same way it does in the
/// running service.
///
/// Accepts both sync and async functions; extra arguments are forwarded to
/// `tokio::test` for async ones:
///
/// ```ignore
/// #[foreman::test]
/// fn sync_case() { ... }
///
/// #[foreman::test(start_paused = true)]
/// async fn timing_case() { ... }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let forwarded = proc_macro2::TokenStream::from(attr);
    let func = parse_macro_input!(item as ItemFn);

    let vis = &func.vis;
    let sig = &func.sig;
    let body = &func.block;
    let name = &func.sig.ident;

    let tokio_attr = if forwarded.is_empty() {
        quote! { #[tokio::test] }
    } else {
        quote! { #[tokio::test(#forwarded)] }
    };

    let expanded = if sig.asyncness.is_some() {
        quote! {
            #tokio_attr
            #vis #sig {
                foreman::trace::with_test_tracing(stringify!(#name), || async move #body).await
            }
        }
    } else {
        quote! {
            #[test]
            #vis #sig {
                foreman::trace::with_test_tracing_sync(stringify!(#name), || #body)
            }
        }
    };
    expanded.into()
}
