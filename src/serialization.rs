//! Module with JSON serialization helpers.

/// `I256` serialization methods.
pub mod i256 {
    use ethnum::{AsI256 as _, I256, U256};
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt::{self, Formatter};

    struct I256Visitor;

    impl<'de> Visitor<'de> for I256Visitor {
        type Value = I256;

        fn expecting(&self, f: &mut Formatter) -> fmt::Result {
            f.write_str("number, decimal string or '0x-' prefixed hexadecimal string")
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.as_i256())
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.as_i256())
        }

        fn visit_i128<E>(self, v: i128) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.as_i256())
        }

        fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.as_i256())
        }

        fn visit_f32<E>(self, v: f32) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !(0.0..(1_u64 << 24) as _).contains(&v.abs()) {
                return Err(de::Error::custom(
                    "invalid conversion from single precision floating point \
                     number outside of valid integer range (-2^24, 2^24)",
                ));
            }

            self.visit_f64(v as _)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.fract() != 0. {
                return Err(de::Error::custom(
                    "invalid conversion from floating point number \
                     with fractional part to 256-bit integer",
                ));
            }
            if !(0.0..(1_u64 << 53) as _).contains(&v.abs()) {
                return Err(de::Error::custom(
                    "invalid conversion from double precision floating point \
                     number outside of valid integer range (-2^53, 2^53)",
                ));
            }

            Ok(v.as_i256())
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let v = v.trim();
            let (u, neg) = match v.strip_prefix('-') {
                Some(v) => (v, true),
                None => (v, false),
            };
            let (src, radix) = match u.strip_prefix("0x") {
                Some(u) => (u, 16),
                None => (u, 10),
            };
            let value = U256::from_str_radix(src, radix)
                .map_err(de::Error::custom)?
                .as_i256();
            match (neg, value) {
                (true, I256::MIN) => Ok(value),
                (true, v) if v > 0 => Ok(v.wrapping_neg()),
                (true, I256::ZERO) => Err(de::Error::custom("negative zero is invalid")),
                (true, _) => Err(de::Error::custom("number too small to fit in target type")),
                (false, v) if v >= 0 => Ok(v),
                (false, _) => Err(de::Error::custom("number too big to fit in target type")),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<I256, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(I256Visitor)
    }
}

/// `U256` serialization methods.
pub mod u256 {
    use ethnum::{AsU256 as _, U256};
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt::{self, Formatter};

    struct U256Visitor;

    impl<'de> Visitor<'de> for U256Visitor {
        type Value = U256;

        fn expecting(&self, f: &mut Formatter) -> fmt::Result {
            f.write_str("number, decimal string or '0x-' prefixed hexadecimal string")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.as_u256())
        }

        fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.as_u256())
        }

        fn visit_f32<E>(self, v: f32) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !(0.0..(1_u64 << 24) as _).contains(&v) {
                return Err(de::Error::custom(
                    "invalid conversion from single precision floating point \
                     number outside of valid integer range [0, 2^24)",
                ));
            }

            self.visit_f64(v as _)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.fract() != 0. {
                return Err(de::Error::custom(
                    "invalid conversion from floating point number \
                     with fractional part to 256-bit integer",
                ));
            }
            if !(0.0..(1_u64 << 53) as _).contains(&v) {
                return Err(de::Error::custom(
                    "invalid conversion from double precision floating point \
                     number outside of valid integer range [0, 2^53)",
                ));
            }

            Ok(v.as_u256())
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let v = v.trim();
            let (src, radix) = match v.strip_prefix("0x") {
                Some(v) => (v, 16),
                None => (v, 10),
            };
            U256::from_str_radix(src, radix)
                .map_err(|err| de::Error::custom(format!("invalid integer '{v}': {err}")))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(U256Visitor)
    }
}

/// Dynamic byte array serialization methods, as `0x`-prefixed hex strings.
pub mod bytes {
    use serde::{
        de::{self, Deserializer},
        Deserialize as _, Serializer,
    };
    use std::borrow::Cow;

    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<str>::deserialize(deserializer)?;
        let s = s
            .strip_prefix("0x")
            .ok_or_else(|| de::Error::custom("byte string missing '0x' prefix"))?;
        hex::decode(s).map_err(de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        #[derive(Deserialize, Serialize)]
        #[serde(transparent)]
        struct Helper(#[serde(with = "super")] Vec<u8>);

        pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            value.clone().map(Helper).serialize(serializer)
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let option = Option::deserialize(deserializer)?;
            Ok(option.map(|Helper(v)| v))
        }
    }
}

/// Distinguishes a field explicitly set to `null` from a missing one.
///
/// Use together with `#[serde(default)]`: a missing field deserializes to
/// `None`, an explicit `null` to `Some(None)`.
pub mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Text fields that may also be provided as JSON numbers or booleans.
///
/// HTML forms submit strings while scripted clients tend to send numbers;
/// both are accepted and rendered back to their textual representation.
pub mod text {
    use serde::{de, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(value) => Err(de::Error::custom(format!(
                "expected a string or number but got '{value}'"
            ))),
        }
    }
}
