use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Error, ItemFn, ReturnType, Signature, Type};

/// The `#[main]` attribute macro, which is used to mark the entry point of the program.
///
/// The reset handler calls the marked function after reset. It must take no arguments, and either
/// never return (`() -> !`) or return nothing (`() -> ()`). What happens when it returns is
/// decided by the reset handler.
#[proc_macro_attribute]
pub fn main(args: TokenStream1, input: TokenStream1) -> TokenStream1 {
    if !args.is_empty() {
        return Error::new_spanned(TokenStream::from(args), "this macro takes no arguments")
            .into_compile_error()
            .into();
    }

    match modify_fn(parse_macro_input!(input as ItemFn)) {
        Ok(stream) => stream.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn modify_fn(
    ItemFn {
        attrs,
        vis,
        sig:
            Signature {
                constness,
                asyncness,
                unsafety,
                abi,
                fn_token,
                ident,
                generics,
                inputs,
                variadic,
                output,
                ..
            },
        block,
    }: ItemFn,
) -> Result<TokenStream, Error> {
    if asyncness.is_some() {
        return Err(Error::new_spanned(
            asyncness,
            "main function cannot be async",
        ));
    }
    if unsafety.is_some() {
        return Err(Error::new_spanned(
            unsafety,
            "main function cannot be unsafe",
        ));
    }
    if abi.is_some() {
        return Err(Error::new_spanned(
            abi,
            "main function must use the default ABI",
        ));
    }
    if !generics.params.is_empty() {
        return Err(Error::new_spanned(
            generics,
            "main function cannot have generic parameters",
        ));
    }
    if !inputs.is_empty() {
        return Err(Error::new_spanned(
            inputs,
            "main function cannot have parameters",
        ));
    }
    if variadic.is_some() {
        return Err(Error::new_spanned(
            variadic,
            "main function cannot be variadic",
        ));
    }
    if let ReturnType::Type(_, return_type) = &output {
        match return_type.as_ref() {
            Type::Never(_) => {}
            Type::Tuple(unit) if unit.elems.is_empty() => {}
            _ => {
                return Err(Error::new_spanned(
                    return_type,
                    "main function return type must be `!` or `()`",
                ))
            }
        }
    }

    // The user's function stays callable under its own name; the reset handler reaches it through
    // the `_main` symbol.
    Ok(quote! {
        #(#attrs)*
        #vis #constness #fn_token #ident () #output #block

        const _: () = {
            #[unsafe(export_name = "_main")]
            fn __f103_entry() {
                #ident()
            }
        };
    })
}
