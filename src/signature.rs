//! Type-level description of C exports.
//!
//! `(Args, Res)` names an `unsafe extern "C" fn(Args...) -> Res`, where
//! `Args` is a tuple of up to six arguments and `()` is a nullary export
//! such as `hello`. [`Invoke`] spreads the tuple over the call. It is an
//! `unsafe fn` because the pointer's real signature is only asserted by
//! whoever resolved the symbol; [`crate::load::Export::call`] passes that
//! obligation on to its caller.

macro_rules! for_each_arity {
    ($mac:ident) => {
        $mac!();
        $mac!(A1);
        $mac!(A1 A2);
        $mac!(A1 A2 A3);
        $mac!(A1 A2 A3 A4);
        $mac!(A1 A2 A3 A4 A5);
        $mac!(A1 A2 A3 A4 A5 A6);
    };
}

/// Maps an `(Args, Res)` pair to the C function pointer type of an export
/// taking `Args` (a tuple) and returning `Res`.
pub trait Signature {
    type Output;
}

macro_rules! impl_signature {
    ($($args:ident)*) => {
        impl<$($args,)* Res> Signature for (($($args,)*), Res) {
            type Output = unsafe extern "C" fn($($args),*) -> Res;
        }
    };
}

for_each_arity!(impl_signature);

/// Spreads an argument tuple over a call to a resolved export.
pub trait Invoke<Args, Res>
where
    (Args, Res): Signature,
{
    /// # Safety
    /// `func` must really have the C signature described by `(Args, Res)`.
    unsafe fn invoke(args: Args, func: &<(Args, Res) as Signature>::Output) -> Res;
}

macro_rules! impl_invoke {
    ($($args:ident)*) => {
        #[allow(non_snake_case)]
        impl<$($args,)* Res> Invoke<($($args,)*), Res> for ($($args,)*) {
            unsafe fn invoke(
                ($($args,)*): ($($args,)*),
                func: &unsafe extern "C" fn($($args),*) -> Res,
            ) -> Res {
                unsafe { func($($args),*) }
            }
        }
    };
}

for_each_arity!(impl_invoke);
