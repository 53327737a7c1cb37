use serde::{Deserialize, Serialize};

/// Declares an enum persisted as a fixed integer code.
macro_rules! coded_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn code(self) -> i32 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            pub fn from_code(code: i32) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

coded_enum! {
    UserRole {
        User = 0,
        Agent = 1,
        Admin = 2,
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

coded_enum! {
    PropertyType {
        Apartment = 1,
        House = 2,
        Villa = 3,
        Land = 4,
        Office = 5,
        Shop = 6,
    }
}

coded_enum! {
    PropertyStatus {
        ForSale = 1,
        ForRent = 2,
        Sold = 3,
        Rented = 4,
    }
}

coded_enum! {
    PaymentStatus {
        Pending = 1,
        Completed = 2,
        Failed = 3,
        Refunded = 4,
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

coded_enum! {
    /// What a payment is for.
    PaymentType {
        Purchase = 1,
        RentDeposit = 2,
        RentPayment = 3,
        Commission = 4,
    }
}
