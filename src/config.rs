use std::env;

#[derive(Clone)]
pub struct StripeSettings {
    pub secret_key: String,
    pub webhook_secret: String,
    pub premium_monthly_price_id: String,
    pub premium_yearly_price_id: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    pub auth_cookie_secure: bool,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub stripe: StripeSettings,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let frontend_origin = env::var("FRONTEND_ORIGIN").expect("FRONTEND_ORIGIN must be set");

        let auth_cookie_secure = env::var("AUTH_COOKIE_SECURE")
            .map(|v| v != "false")
            .unwrap_or(true);

        let jwt_issuer = env::var("JWT_ISSUER").expect("JWT_ISSUER must be set");
        let jwt_audience = env::var("JWT_AUDIENCE").expect("JWT_AUDIENCE must be set");

        let stripe = StripeSettings {
            secret_key: env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set"),
            webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .expect("STRIPE_WEBHOOK_SECRET must be set"),
            premium_monthly_price_id: env::var("STRIPE_PREMIUM_MONTHLY_PRICE_ID")
                .expect("STRIPE_PREMIUM_MONTHLY_PRICE_ID must be set"),
            premium_yearly_price_id: env::var("STRIPE_PREMIUM_YEARLY_PRICE_ID")
                .expect("STRIPE_PREMIUM_YEARLY_PRICE_ID must be set"),
        };

        Config {
            database_url,
            frontend_origin,
            auth_cookie_secure,
            jwt_issuer,
            jwt_audience,
            stripe,
        }
    }

    pub fn payment_success_url(&self) -> String {
        format!("{}/payment/success", self.frontend_origin)
    }

    pub fn payment_cancel_url(&self) -> String {
        format!("{}/payment/cancelled", self.frontend_origin)
    }
}
