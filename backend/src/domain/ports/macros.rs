//! `define_port_error!` declares a port error enum with a `thiserror`
//! display string per variant and a snake_case constructor for each variant.
//! Constructor parameters take `impl Into<T>`, so `&str` works for `String`
//! fields.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
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
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
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
    define_port_error! {
        pub enum SamplePortError {
            Connection { message: String } => "connection failed: {message}",
            Capacity { limit: u32 } => "too many recipients: {limit}",
            Rejected { message: String, status: u16 } => "rejected ({status}): {message}",
            Unconfigured => "sender is not configured",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SamplePortError::connection("pool closed");
        assert_eq!(err.to_string(), "connection failed: pool closed");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = SamplePortError::capacity(50_u32);
        assert_eq!(err, SamplePortError::Capacity { limit: 50 });
    }

    #[test]
    fn mixed_fields_render_in_message() {
        let err = SamplePortError::rejected("bad address", 422_u16);
        assert_eq!(err.to_string(), "rejected (422): bad address");
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(
            SamplePortError::unconfigured().to_string(),
            "sender is not configured"
        );
    }
}
