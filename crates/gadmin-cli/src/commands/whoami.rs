use anyhow::Result;
use chrono::DateTime;
use gadmin_auth::{CredentialSource, parse_claims};

use crate::session::Session;

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

pub fn run(session: &Session) -> Result<()> {
    let Some(token) = session.tokens.current() else {
        println!("Not signed in. Run `gadmin login <token>`.");
        return Ok(());
    };
    let Some(claims) = parse_claims(&token) else {
        println!("Stored token cannot be decoded.");
        return Ok(());
    };

    let user_id = claims
        .user_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());

    println!("Signed-in account:");
    println!("  User ID:        {user_id}");
    println!("  Username:       {}", claims.username.as_deref().unwrap_or("-"));
    println!("  Nickname:       {}", claims.nickname.as_deref().unwrap_or("-"));
    if let Some(user_type) = claims.user_type {
        println!("  Type:           {user_type}");
    }
    println!("  Super admin:    {}", claims.is_super_admin);
    if !claims.role_ids.is_empty() {
        let roles: Vec<String> = claims.role_ids.iter().map(ToString::to_string).collect();
        println!("  Roles:          {}", roles.join(", "));
    }
    if let Some(iat) = claims.iat {
        println!("  Issued:         {}", format_timestamp(iat));
    }
    if let Some(exp) = claims.exp {
        let expired = exp < chrono::Utc::now().timestamp();
        println!(
            "  Expires:        {}{}",
            format_timestamp(exp),
            if expired { " (expired)" } else { "" }
        );
    }

    Ok(())
}
