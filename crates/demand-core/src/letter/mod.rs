//! Demand letter field resolution and plain-text rendering.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::extract::rules::{format_date, normalize_date, normalize_percent, parse_money, parse_percent};
use crate::models::canonical::{Canonical, Money};
use crate::models::config::LetterConfig;
use crate::models::letter::{DemandLetter, DemandLetterInput, LetterField};

/// Resolves letter inputs and renders the letter text.
#[derive(Debug, Clone)]
pub struct DemandLetterBuilder {
    config: LetterConfig,
}

impl DemandLetterBuilder {
    pub fn new(config: &LetterConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Resolve every field to display text.
    ///
    /// `today` is used when the input has no `today` value. The revenue-share
    /// amount and the shortfall are computed when left blank and their inputs
    /// parse.
    pub fn build(&self, input: &DemandLetterInput, today: NaiveDate) -> DemandLetter {
        let text = |field, default: &str| input.get(field).unwrap_or(default).to_string();
        let date = |field| normalize_date(input.get(field).unwrap_or("")).display();
        let money = |field| money_input(input, field);

        let total_revenue = money(LetterField::TotalRevenue);
        let rr_percent = parse_percent(input.get(LetterField::RrPercent).unwrap_or(""));
        let successful_payments = money(LetterField::SuccessfulPayments);

        let mut rr_amount = money(LetterField::RrAmount);
        if rr_amount.is_absent() {
            if let (Some(revenue), Some(rate)) = (total_revenue.parsed(), rr_percent.parsed()) {
                let computed = *revenue * *rate;
                debug!("Computed revenue share amount {}", computed);
                rr_amount = Canonical::Parsed(computed);
            }
        }

        let mut shortfall = money(LetterField::Shortfall);
        if shortfall.is_absent() {
            if let (Some(due), Some(paid)) = (rr_amount.parsed(), successful_payments.parsed()) {
                match due.shortfall_after(*paid) {
                    Some(computed) => {
                        debug!("Computed shortfall {}", computed);
                        shortfall = Canonical::Parsed(computed);
                    }
                    None => warn!("Shortfall out of range for {} due, {} paid", due, paid),
                }
            }
        }

        let today = match input.get(LetterField::Today) {
            Some(raw) => normalize_date(raw).display(),
            None => format_date(today),
        };

        let letter = DemandLetter {
            business_name: text(LetterField::BusinessName, &self.config.default_business_name),
            business_address: text(
                LetterField::BusinessAddress,
                &self.config.default_business_address,
            ),
            contact_name: text(LetterField::ContactName, &self.config.default_contact_name),
            today,
            effective_date: date(LetterField::EffectiveDate),
            default_date: date(LetterField::DefaultDate),
            last_payment_date: date(LetterField::LastPaymentDate),
            total_advance_plus_fee: money(LetterField::TotalAdvancePlusFee).display(),
            advance_amount: money(LetterField::AdvanceAmount).display(),
            fee: money(LetterField::Fee).display(),
            total_revenue: total_revenue.display(),
            rr_percent: normalize_percent(input.get(LetterField::RrPercent).unwrap_or("")),
            rr_amount: rr_amount.display(),
            successful_payments: successful_payments.display(),
            percent_or_amount_due: money(LetterField::PercentOrAmountDue).display(),
            shortfall: shortfall.display(),
        };

        info!(
            "Resolved demand letter for {} ({} blank fields)",
            letter.business_name,
            letter.blank_fields().len()
        );
        letter
    }

    /// Render the letter as plain text: title, addressee, subject, body and signature.
    pub fn render_text(&self, letter: &DemandLetter) -> String {
        let config = &self.config;
        let name = &letter.business_name;
        let short = &config.company_short_name;

        let mut out = String::new();
        out.push_str("LETTER OF DEMAND\n\n");
        out.push_str(&format!(
            "{}\n{}\n{}\n\n",
            name, letter.business_address, config.country
        ));
        out.push_str(&format!("SENT VIA EMAIL ON {}\n\n", letter.today));
        out.push_str(&format!("Re: Demand for Payment - {}\n\n", config.product));
        out.push_str(&format!("Dear {},\n\n", letter.contact_name));

        out.push_str(&format!(
            "This is our last attempt and FINAL WARNING to seek payment for {name}'s merchant cash \
             advance (\"MCA\") before we seek all legal remedies available to us. {name} (\"you\") \
             entered into an MCA Agreement (\"Agreement\") with {company} (the \"Company\") dated \
             {effective} (the \"Effective Date\") for an MCA in the total amount of {total} \
             (consisting of an MCA advance of {advance} and a fee of {fee}).\n\n",
            company = config.company_name,
            effective = letter.effective_date,
            total = letter.total_advance_plus_fee,
            advance = letter.advance_amount,
            fee = letter.fee,
        ));

        out.push_str(&format!(
            "Since {default_date}, {name} has failed to comply with its terms, by generating revenue \
             and failing to deliver and/or preventing {short} from receiving its share of revenue \
             payments. As of {today}, {name} has had {revenue} in revenue payments of which {rate} \
             ({rr_amount}) are payable to {short} under the terms of the Agreement. We have only \
             received {paid} towards your Total Advance Amount. The last payment to {short} was on \
             {last_payment}.\n\n",
            default_date = letter.default_date,
            today = letter.today,
            revenue = letter.total_revenue,
            rate = letter.rr_percent,
            rr_amount = letter.rr_amount,
            paid = letter.successful_payments,
            last_payment = letter.last_payment_date,
        ));

        out.push_str(&format!(
            "Your failure to pay {short} the agreed upon percentage of revenue {due}, is a breach of \
             the Agreement. We have attempted to contact you and resolve this issue informally \
             multiple times. Despite {short}'s continuous efforts to resolve this issue, we have not \
             received a payment.\n\n",
            due = letter.percent_or_amount_due,
        ));

        out.push_str(&format!(
            "If a payment of {shortfall} is not received within {days} business days of receipt of \
             this letter, we will seek all remedies available to us under the Agreement, including \
             referring this matter to a third-party collections firm or seeking appropriate legal \
             action. You may also be held liable and subject to additional fees incurred by {short} \
             in an attempt to pursue these payments.\n\n",
            shortfall = letter.shortfall,
            days = config.cure_days,
        ));

        out.push_str(
            "We urge you to treat this matter with the utmost urgency and to cooperate fully in \
             resolving this breach amicably.\n\n",
        );
        out.push_str(&format!("{}\n\n", config.contact_line));
        out.push_str("Thank you for your immediate attention to this critical issue.\n\n");
        out.push_str(&format!("{}\n{}\n", config.signature_team, config.company_name));
        out
    }
}

fn money_input(input: &DemandLetterInput, field: LetterField) -> Canonical<Money> {
    parse_money(input.get(field).unwrap_or(""))
}
