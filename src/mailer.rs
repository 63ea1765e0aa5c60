use async_trait::async_trait;
use indoc::formatdoc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Tells a contributor a payout is on its way and asks for their
    /// PayPal details.
    async fn send_payment_request(
        &self,
        to: &str,
        total_views: u64,
        amount: Decimal,
    ) -> Result<(), anyhow::Error>;

    /// Confirms a clip was received.
    async fn send_submission_received(&self, to: &str) -> Result<(), anyhow::Error>;
}

/// Transactional email via the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> ResendMailer {
        ResendMailer {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }

    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), anyhow::Error> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequest {
                from: &self.from,
                to: [to],
                subject,
                text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail API rejected the send with {status}: {body}");
        }

        debug!("Sent \"{subject}\" to {to}");

        Ok(())
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_payment_request(
        &self,
        to: &str,
        total_views: u64,
        amount: Decimal,
    ) -> Result<(), anyhow::Error> {
        let body = formatdoc! {
            r#"
                Hello,

                Great news! We're ready to process a payment for your clip submissions.

                Payment details:
                - Total views: {total_views}
                - Payment amount: ${amount:.2}

                Next steps:
                1. Reply with your PayPal account email address.
                2. Attach a simple invoice with your details.

                Please include your PayPal email in your response so we can process
                the payment quickly.

                Best regards,
                The Clipper Team
            "#,
        };

        self.send(to, "Payment Request - Provide Your PayPal Details", &body)
            .await
    }

    async fn send_submission_received(&self, to: &str) -> Result<(), anyhow::Error> {
        let body = formatdoc! {
            r#"
                Hello,

                Thanks for your submission! Your clip has been received and is
                waiting for review. Once its views are verified you will see it
                reflected in your next payment.

                Best regards,
                The Clipper Team
            "#,
        };

        self.send(to, "We received your clip", &body).await
    }
}
