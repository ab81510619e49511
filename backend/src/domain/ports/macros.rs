//! Helper macro for declaring port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! fields accept anything convertible into the declared type, so adapters can
//! write `DocumentStoreError::not_found(path.to_string())` or pass `&str`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($(#[$field_meta])* $field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        /// Error used to exercise the macro.
        pub enum ProbePortError {
            /// No payload.
            Offline => "offline",
            /// String payload.
            Rejected {
                /// Reason.
                reason: String,
            } => "rejected: {reason}",
            /// Mixed payload.
            Throttled {
                /// Path.
                path: String,
                /// Attempts.
                attempts: u32,
            } => "throttled {path} after {attempts}",
        }
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(ProbePortError::offline(), ProbePortError::Offline);
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ProbePortError::rejected("rules");
        assert_eq!(err.to_string(), "rejected: rules");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ProbePortError::throttled("patients/p1", 3_u32);
        assert_eq!(err.to_string(), "throttled patients/p1 after 3");
    }
}
