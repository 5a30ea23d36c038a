/// Declares a capability trait whose methods forward to the object.
///
/// Each entry reads `fn rust_name(params) -> Ret = "WireName";`, optionally
/// followed by `[nonempty param, ...]` for text arguments that must not be
/// empty. Methods that need hand-written packing go in a trailing
/// `provided { ... }` block. The trait is implemented for every
/// [`Invoke`](crate::Invoke).
macro_rules! dm_api {
    (
        $(#[$trait_meta:meta])*
        pub trait $trait:ident {
            $(
                $(#[$meta:meta])*
                fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty = $wire:literal
                    $([nonempty $($ne:ident),+])?;
            )*
        }
        $(provided { $($provided:tt)* })?
    ) => {
        $(#[$trait_meta])*
        pub trait $trait: $crate::Invoke + Sized {
            $(
                $(#[$meta])*
                fn $name(&self, $($arg: $ty),*) -> $crate::Result<$ret> {
                    $($( $crate::args::require_text(stringify!($ne), $ne)?; )+)?
                    #[allow(unused_mut)]
                    let mut args = $crate::ArgList::new();
                    $( $crate::args::PushArgs::push_args($arg, &mut args)?; )*
                    self.call($wire, args)
                }
            )*

            $($($provided)*)?
        }

        impl<T: $crate::Invoke> $trait for T {}
    };
}
