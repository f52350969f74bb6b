//! Message rendering — decision in, subject and HTML body out.
//!
//! The copy here is not load-bearing; the data each message must carry is
//! (service name, amount, payment date, totals, overage). Layout stays
//! simple inline HTML.

use std::fmt::Write as _;

use subtrack_core::{
  decision::{
    BudgetAlert, Decision, MonthlySummary, PaymentReminder, SubscriptionAdded,
  },
  notifier::OutboundEmail,
};

/// Render the email for a decision.
pub fn render(decision: &Decision) -> OutboundEmail {
  match decision {
    Decision::PaymentReminder(r) => payment_reminder(r),
    Decision::BudgetAlert(a) => budget_alert(a),
    Decision::MonthlySummary(s) => monthly_summary(s),
    Decision::SubscriptionAdded(c) => subscription_added(c),
  }
}

fn payment_reminder(r: &PaymentReminder) -> OutboundEmail {
  OutboundEmail {
    to:        r.user.email.clone(),
    subject:   format!(
      "Payment Reminder: {} due in {} days",
      r.subscription.name, r.days_until
    ),
    body_html: format!(
      "<html><body>\
       <h2>Payment Reminder</h2>\
       <p>Your subscription to <strong>{name}</strong> will renew in \
       <strong>{days} days</strong>.</p>\
       <ul>\
       <li>Service: {name}</li>\
       <li>Amount: ${price:.2}</li>\
       <li>Payment date: {due}</li>\
       </ul>\
       <p>Make sure you have sufficient funds in your account.</p>\
       </body></html>",
      name = r.subscription.name,
      days = r.days_until,
      price = r.subscription.monthly_price,
      due = r.due_on.format("%B %d, %Y"),
    ),
  }
}

fn budget_alert(a: &BudgetAlert) -> OutboundEmail {
  OutboundEmail {
    to:        a.user.email.clone(),
    subject:   "Budget Alert: you have exceeded your monthly limit".into(),
    body_html: format!(
      "<html><body>\
       <h2>Budget Alert</h2>\
       <p>Your subscription spending has exceeded your monthly budget.</p>\
       <ul>\
       <li>Monthly budget: ${budget:.2}</li>\
       <li>Current spending: ${total:.2}</li>\
       <li><strong>Over budget: ${overage:.2}</strong></li>\
       </ul>\
       <p>Consider reviewing subscriptions you no longer use.</p>\
       </body></html>",
      budget = a.budget,
      total = a.monthly_total,
      overage = a.overage,
    ),
  }
}

fn monthly_summary(s: &MonthlySummary) -> OutboundEmail {
  let mut rows = String::new();
  for sub in &s.subscriptions {
    let _ = write!(
      rows,
      "<tr><td>{}</td><td>${:.2}</td></tr>",
      sub.name, sub.monthly_price
    );
  }

  OutboundEmail {
    to:        s.user.email.clone(),
    subject:   format!(
      "Monthly Summary: ${:.2} in subscriptions",
      s.totals.monthly_total
    ),
    body_html: format!(
      "<html><body>\
       <h2>Monthly Subscription Summary</h2>\
       <p>Total monthly spending: <strong>${monthly:.2}</strong> across \
       {count} active subscription(s) — ${yearly:.2} per year.</p>\
       <table>\
       <thead><tr><th>Service</th><th>Monthly cost</th></tr></thead>\
       <tbody>{rows}</tbody>\
       <tfoot><tr><td>Total</td><td>${monthly:.2}</td></tr></tfoot>\
       </table>\
       </body></html>",
      monthly = s.totals.monthly_total,
      yearly = s.totals.yearly_total,
      count = s.totals.subscription_count,
    ),
  }
}

fn subscription_added(c: &SubscriptionAdded) -> OutboundEmail {
  OutboundEmail {
    to:        c.user.email.clone(),
    subject:   "New Subscription Added - SubTrack".into(),
    body_html: format!(
      "<html><body>\
       <h2>Subscription Confirmed</h2>\
       <p>Your subscription to <strong>{name}</strong> has been added.</p>\
       <p>Monthly cost: ${price:.2}</p>\
       <p>We'll notify you before upcoming payments.</p>\
       </body></html>",
      name = c.subscription.name,
      price = c.subscription.monthly_price,
    ),
  }
}
