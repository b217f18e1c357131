use std::time::Duration;

use bigdecimal::BigDecimal;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::user_email::UserEmail;

// Client for the transactional-mail gateway. Order confirmations are
// best-effort: callers log failures and never roll back the order.
#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: UserEmail,
    authorization_token: SecretString,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: UserEmail,
        authorization_token: SecretString,
        timeout: u64,
    ) -> EmailClient {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .unwrap();

        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        }
    }

    #[tracing::instrument(
        "Sending email through the mail gateway",
        skip(self, subject, html_content, text_content)
    )]
    pub async fn send_email(
        &self,
        recipient: &UserEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let request_body = SendEmailRequest {
            from: &self.sender.inner(),
            to: &recipient.inner(),
            subject,
            html_body: html_content,
            text_body: text_content,
        };
        self.http_client
            .post(url)
            .json(&request_body)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn send_order_confirmation(
        &self,
        recipient: &UserEmail,
        order_id: i32,
        total_amount: &BigDecimal,
    ) -> Result<(), reqwest::Error> {
        let subject = format!("Order #{} confirmed", order_id);
        let text = format!(
            "Your order #{} has been placed. Total: {}. \
             We will let you know when the restaurant starts preparing it.",
            order_id, total_amount
        );
        let html = format!(
            "<p>Your order <b>#{}</b> has been placed.</p><p>Total: {}</p>",
            order_id, total_amount
        );

        self.send_email(recipient, &subject, &html, &text).await
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub html_body: &'a str,
    pub text_body: &'a str,
}
