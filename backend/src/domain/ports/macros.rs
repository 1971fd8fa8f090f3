//! `define_port_error!` declares the error enum of a port.
//!
//! Each variant is written as `Variant { field: Type, .. } => "display"` and
//! gets a snake_case constructor whose arguments accept `impl Into<Type>`, so
//! adapters write `EventRepositoryError::query(err.to_string())` or
//! `PaymentGatewayError::timeout("10s")`. Unit variants get a no-argument
//! constructor.

macro_rules! define_port_error {
    (
        $(#[$enum_attr:meta])*
        pub enum $name:ident {
            $(
                $(#[$attr:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $display:expr
            ),* $(,)?
        }
    ) => {
        $(#[$enum_attr])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$attr])*
                #[error($display)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>]($( $($field: impl Into<$ty>),* )?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;
