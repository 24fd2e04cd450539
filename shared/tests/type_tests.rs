/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; unit tests that are tightly coupled to
/// private helpers live inside the modules themselves (see `#[cfg(test)]`
/// blocks in `register.rs` and `config.rs`).
// ---------------------------------------------------------------------------
// JWT claims
// ---------------------------------------------------------------------------
#[cfg(test)]
mod jwt_tests {
    use shared::types::*;

    fn sample_claims() -> JwtClaims {
        JwtClaims {
            sub: "7b0d6a9e-6a43-4c59-9a4e-2f4b8f0c1d22".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        }
    }

    #[test]
    fn claims_serialize_and_deserialize_roundtrip() {
        let c = sample_claims();
        let json = serde_json::to_string(&c).unwrap();
        let back: JwtClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn claims_json_contains_expected_keys() {
        let json = serde_json::to_value(&sample_claims()).unwrap();
        for key in &["sub", "email", "role", "iat", "exp"] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn role_serializes_lowercase() {
        let mut c = sample_claims();
        c.role = Role::Admin;
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn unrecognised_role_becomes_unknown() {
        let json = r#"{"sub":"x","email":"x@example.com","role":"superuser","iat":1,"exp":2}"#;
        let c: JwtClaims = serde_json::from_str(json).unwrap();
        assert_eq!(c.role, Role::Unknown);
    }

    #[test]
    fn role_parse_matches_serde_names() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("user"), Role::User);
        assert_eq!(Role::parse("Admin"), Role::Unknown);
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn missing_role_is_rejected() {
        let json = r#"{"sub":"x","email":"x@example.com","iat":1,"exp":2}"#;
        assert!(serde_json::from_str::<JwtClaims>(json).is_err());
    }
}

// ---------------------------------------------------------------------------
// Login types
// ---------------------------------------------------------------------------

#[cfg(test)]
mod login_tests {
    use shared::types::*;

    #[test]
    fn login_data_deserializes_email_and_password() {
        let json = r#"{"email":"bob@example.com","password":"pass123"}"#;
        let d: LoginData = serde_json::from_str(json).unwrap();
        assert_eq!(d.email, "bob@example.com");
        assert_eq!(d.password, "pass123");
    }

    #[test]
    fn login_data_without_password_is_rejected() {
        let json = r#"{"email":"bob@example.com"}"#;
        assert!(serde_json::from_str::<LoginData>(json).is_err());
    }

    #[test]
    fn all_error_variants_have_non_empty_messages() {
        for e in [
            LoginError::UserNotFound,
            LoginError::WrongPassword,
            LoginError::MissingField("email".into()),
        ] {
            assert!(!e.to_code().is_empty());
            assert!(!e.to_message().is_empty());
        }
    }

    #[test]
    fn login_messages_match_the_api() {
        assert_eq!(LoginError::UserNotFound.to_message(), "The user not found");
        assert_eq!(LoginError::WrongPassword.to_message(), "password is wrong!");
    }

    #[test]
    fn login_response_carries_user_and_token() {
        let r = LoginResponse {
            user: "alice@example.com".into(),
            token: "h.p.s".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["user"], "alice@example.com");
        assert_eq!(json["token"], "h.p.s");
    }

    #[test]
    fn logout_response_shape() {
        let json = serde_json::to_value(LogoutResponse::logged_out()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Logged out");
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[cfg(test)]
mod user_tests {
    use shared::types::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: "id-1".into(),
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@example.com".into(),
            role: Role::User,
            avatar: Image {
                public_id: None,
                url: "https://img.example.com/default.jpg".into(),
            },
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn default_avatar_omits_public_id() {
        let json = serde_json::to_value(profile()).unwrap();
        assert!(json["avatar"].get("public_id").is_none());
        assert_eq!(json["avatar"]["url"], "https://img.example.com/default.jpg");
    }

    #[test]
    fn uploaded_avatar_keeps_public_id() {
        let mut p = profile();
        p.avatar.public_id = Some("UserProfile/ada-1".into());
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["avatar"]["public_id"], "UserProfile/ada-1");
    }

    #[test]
    fn profile_uses_camel_case_timestamp() {
        let json = serde_json::to_value(profile()).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000);
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn profile_never_mentions_password() {
        let json = serde_json::to_string(&profile()).unwrap();
        assert!(!json.contains("password"));
    }

    #[test]
    fn profile_update_fields_are_optional() {
        let d: ProfileUpdateData = serde_json::from_str(r#"{"email":"new@example.com"}"#).unwrap();
        assert_eq!(d.email.as_deref(), Some("new@example.com"));
        assert!(d.firstname.is_none());
        assert!(d.lastname.is_none());
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[cfg(test)]
mod register_tests {
    use shared::types::*;

    #[test]
    fn missing_fields_deserialize_to_empty() {
        let d: RegistrationData = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(d.email, "a@b.c");
        assert!(d.firstname.is_empty());
        assert_eq!(d.validate_fields(), Err(RegistrationError::MissingFields));
    }

    #[test]
    fn error_codes_are_distinct() {
        let codes = [
            RegistrationError::MissingFields.to_code(),
            RegistrationError::EmailTaken.to_code(),
            RegistrationError::PasswordTooShort.to_code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }

    #[test]
    fn email_taken_message() {
        assert_eq!(
            RegistrationError::EmailTaken.to_message(),
            "Email is already registered"
        );
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[cfg(test)]
mod product_tests {
    use shared::types::*;

    fn lamp() -> Product {
        Product {
            id: "p-1".into(),
            project_title: "Lamp".into(),
            description: "Brass desk lamp".into(),
            price: 49.5,
            product_type: "lighting".into(),
            images: Image {
                public_id: Some("products/lamp-1".into()),
                url: "https://img.example.com/lamp.png".into(),
            },
            activation: true,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn product_uses_wire_field_names() {
        let json = serde_json::to_value(lamp()).unwrap();
        assert_eq!(json["projectTitle"], "Lamp");
        assert_eq!(json["type"], "lighting");
        assert_eq!(json["createdAt"], 1_700_000_000);
        assert_eq!(json["images"]["url"], "https://img.example.com/lamp.png");
        assert!(json.get("project_title").is_none());
    }

    #[test]
    fn product_roundtrips() {
        let json = serde_json::to_string(&lamp()).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lamp());
    }

    #[test]
    fn reactivate_response_shape() {
        let r = ReactivateResponse {
            success: true,
            message: "Reactivation Success!".into(),
            product: lamp(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["message"], "Reactivation Success!");
        assert_eq!(json["product"]["activation"], true);
    }

    #[test]
    fn all_error_variants_have_codes_and_messages() {
        for e in [
            ProductError::TitleTaken,
            ProductError::TitleRequired,
            ProductError::NoImage,
            ProductError::InvalidId,
            ProductError::InvalidProduct,
            ProductError::InvalidPrice,
            ProductError::InvalidActivation,
            ProductError::NotFound,
            ProductError::NoProducts,
        ] {
            assert!(!e.to_code().is_empty());
            assert!(!e.to_message().is_empty());
        }
    }

    #[test]
    fn product_messages_match_the_api() {
        assert_eq!(
            ProductError::TitleTaken.to_message(),
            "Project Title already exists!"
        );
        assert_eq!(ProductError::NoImage.to_message(), "No image in the request");
        assert_eq!(ProductError::NoProducts.to_message(), "No products found");
    }
}

// ---------------------------------------------------------------------------
// Error body
// ---------------------------------------------------------------------------

#[cfg(test)]
mod error_body_tests {
    use shared::types::ErrorResponse;

    #[test]
    fn error_body_has_only_message() {
        let json = serde_json::to_value(ErrorResponse::new("Unauthorized access")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Unauthorized access" }));
    }
}

// ---------------------------------------------------------------------------
// Config defaults
// ---------------------------------------------------------------------------

#[cfg(test)]
mod config_tests {
    use shared::types::server_config::*;

    #[test]
    fn server_addr_joins_bind_and_port() {
        let s = ServerConfig::default();
        assert_eq!(s.addr(), "127.0.0.1:4000");
    }

    #[test]
    fn default_exemptions_never_open_delete_on_wildcards() {
        for rule in default_exemptions() {
            let wildcard = rule.path.as_deref().is_some_and(|p| p.ends_with('*'));
            if wildcard {
                assert!(!rule.methods.iter().any(|m| m == "DELETE" || m == "*"));
            }
        }
    }

    #[test]
    fn default_exemptions_use_api_placeholder() {
        let rules = default_exemptions();
        assert!(
            rules
                .iter()
                .filter_map(|r| r.path.as_deref())
                .filter(|p| *p != "/health")
                .all(|p| p.starts_with("{api}"))
        );
    }

    #[test]
    fn token_expiry_converts_to_seconds() {
        let auth = AuthConfig {
            jwt_secret: None,
            token_expiry_hours: 2,
            admin_emails: vec![],
            exemptions: vec![],
        };
        assert_eq!(auth.token_expiry_secs(), 7200);
    }

    #[test]
    fn token_expiry_saturates_on_overflow() {
        let auth = AuthConfig {
            jwt_secret: None,
            token_expiry_hours: u64::MAX / 60,
            admin_emails: vec![],
            exemptions: vec![],
        };
        assert_eq!(auth.token_expiry_secs(), u64::MAX);
    }
}
