use crate::cli::{Command, Session};
use crate::config::Settings;
use crate::error::Result;

/// Run one command against the store in `settings.data_dir` and return the
/// lines to print
pub fn execute(command: Command, settings: &Settings) -> Result<Vec<String>> {
    let mut out = Vec::new();
    match command {
        Command::Init => {
            let session = Session::create(settings)?;
            session.commit()?;
            let ledger = session.ledger();
            out.push(format!(
                "Created ledger: ratio {}, cap {}, custodian {}",
                ledger.exchange_ratio(),
                ledger.max_derived_supply(),
                session.token().custodian()
            ));
        }
        Command::Status => {
            let session = Session::open(settings)?;
            let ledger = session.ledger();
            let token = session.token();
            out.push(format!("Exchange ratio:   {}", ledger.exchange_ratio()));
            out.push(format!("Supply cap:       {}", ledger.max_derived_supply()));
            out.push(format!("Issued supply:    {}", ledger.derived_supply_issued()?));
            out.push(format!("Remaining:        {}", ledger.remaining_capacity()?));
            out.push(format!("Base reserve:     {}", token.balance_of(&token.custodian())?));
            out.push(format!("Holders:          {}", ledger.holder_count()?));
            out.push(format!("Events:           {}", session.store().event_count()?));
        }
        Command::Faucet { account, amount } => {
            let session = Session::open(settings)?;
            session.token().mint(&account, amount)?;
            session.commit()?;
            out.push(format!("Minted {amount} base units to {account}"));
        }
        Command::Approve { account, amount } => {
            let session = Session::open(settings)?;
            let custodian = session.token().custodian();
            session.token().approve(&account, &custodian, amount)?;
            session.commit()?;
            out.push(format!(
                "{account} approved the ledger for {amount} base units"
            ));
        }
        Command::Deposit { account, amount } => {
            let session = Session::open(settings)?;
            let event = session.ledger().deposit(&account, amount)?;
            session.commit()?;
            out.push(format!(
                "Deposited {} base units, minted {} derived units to {account}",
                event.base_amount(),
                event.derived_amount()
            ));
        }
        Command::Convert { account, amount } => {
            let session = Session::open(settings)?;
            let event = session.ledger().convert(&account, amount)?;
            session.commit()?;
            out.push(format!(
                "Burned {} derived units, returned {} base units to {account}",
                event.derived_amount(),
                event.base_amount()
            ));
        }
        Command::Balance { account } => {
            let session = Session::open(settings)?;
            let custodian = session.token().custodian();
            out.push(format!(
                "Base balance of {account}: {}",
                session.token().balance_of(&account)?
            ));
            out.push(format!(
                "Derived balance of {account}: {}",
                session.ledger().derived_balance_of(&account)?
            ));
            out.push(format!(
                "Allowance to ledger: {}",
                session.token().allowance(&account, &custodian)?
            ));
        }
        Command::Events => {
            let session = Session::open(settings)?;
            for event in session.store().events()? {
                out.push(serde_json::to_string(&event)?);
            }
        }
        Command::QuoteDeposit { amount } => {
            let session = Session::open(settings)?;
            let minted = session.ledger().preview_deposit(amount)?;
            out.push(format!("Depositing {amount} base units mints {minted} derived units"));
        }
        Command::QuoteConvert { amount } => {
            let session = Session::open(settings)?;
            let base = session.ledger().preview_convert(amount)?;
            out.push(format!("Converting {amount} derived units returns {base} base units"));
        }
    }
    Ok(out)
}
