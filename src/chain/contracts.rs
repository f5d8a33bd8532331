//! Contract gateways for EventFactory and TicketNFT.
//!
//! ABIs are declared with `sol!`; the gateway structs bind an ABI to a
//! deployed address and a [`ChainClient`].

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;

use super::client::{ChainClient, ChainError};
use super::schema::EventSchema;
use super::types::{Log, TransactionReceipt};
use crate::domain::{EventId, TicketId};

/// EventFactory ABI.
#[allow(missing_docs)]
pub mod event_factory {
    alloy_sol_types::sol! {
        function createEvent(
            string name,
            uint256 date,
            string ipfsCID,
            string imageCID,
            uint256 price,
            uint256 maxTickets
        ) external returns (uint256 eventId);

        function getEventDetails(uint256 eventId) external view returns (
            string name,
            uint256 date,
            uint256 price,
            uint256 totalTickets,
            uint256 remaining,
            string ipfsCID,
            string imageCID,
            address organizer
        );

        function events(uint256 eventId) external view returns (
            string name,
            uint256 date,
            string ipfsCID,
            address organizer,
            uint256 maxTickets,
            uint256 ticketsSold
        );

        function purchaseTickets(uint256 eventId, uint256 quantity) external payable;

        function buyTicket(uint256 eventId, uint256 quantity) external payable;
    }
}

/// First-generation `createEvent`, which records neither price nor image.
#[allow(missing_docs)]
pub mod event_factory_v1 {
    alloy_sol_types::sol! {
        function createEvent(
            string name,
            uint256 date,
            string ipfsCID,
            uint256 maxTickets
        ) external returns (uint256 eventId);
    }
}

/// TicketNFT ABI.
#[allow(missing_docs)]
pub mod ticket_nft {
    alloy_sol_types::sol! {
        function mintTicket(address to, uint256 eventId, string uri) external returns (uint256 tokenId);

        function tokenURI(uint256 tokenId) external view returns (string);

        function ownerOf(uint256 tokenId) external view returns (address);

        event TicketMinted(uint256 indexed tokenId, address indexed owner, uint256 eventId);
    }
}

/// Arguments of `createEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventArgs {
    /// Event name stored on-chain.
    pub name: String,
    /// Unix timestamp (seconds).
    pub date: u64,
    /// Metadata content address.
    pub metadata_cid: String,
    /// Image content address (may be empty).
    pub image_cid: String,
    /// Price per ticket in wei.
    pub price: U256,
    /// Ticket supply.
    pub max_tickets: u64,
}

/// Typed accessor to a deployed EventFactory.
#[derive(Debug, Clone)]
pub struct EventFactory {
    client: ChainClient,
    address: Address,
}

impl EventFactory {
    /// Binds the ABI to `address`.
    #[must_use]
    pub fn new(client: ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Contract address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// `getEventDetails(eventId)`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the call fails or reverts.
    pub async fn event_details(
        &self,
        id: EventId,
    ) -> Result<event_factory::getEventDetailsReturn, ChainError> {
        let call = event_factory::getEventDetailsCall {
            eventId: id.to_u256(),
        };
        self.client.read(self.address, &call).await
    }

    /// Legacy public getter `events(eventId)`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the call fails or reverts.
    pub async fn legacy_event(
        &self,
        id: EventId,
    ) -> Result<event_factory::eventsReturn, ChainError> {
        let call = event_factory::eventsCall {
            eventId: id.to_u256(),
        };
        self.client.read(self.address, &call).await
    }

    /// Sends `createEvent` from `from` in the calling convention of
    /// `schema`. A [`EventSchema::V1`] factory takes neither price nor
    /// image, so those arguments are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] on revert, timeout or transport failure.
    pub async fn create_event(
        &self,
        from: Address,
        args: &CreateEventArgs,
        schema: EventSchema,
    ) -> Result<TransactionReceipt, ChainError> {
        match schema {
            EventSchema::V1 => {
                let call = event_factory_v1::createEventCall {
                    name: args.name.clone(),
                    date: U256::from(args.date),
                    ipfsCID: args.metadata_cid.clone(),
                    maxTickets: U256::from(args.max_tickets),
                };
                self.client.send(from, self.address, &call, U256::ZERO).await
            }
            EventSchema::V2 => {
                let call = event_factory::createEventCall {
                    name: args.name.clone(),
                    date: U256::from(args.date),
                    ipfsCID: args.metadata_cid.clone(),
                    imageCID: args.image_cid.clone(),
                    price: args.price,
                    maxTickets: U256::from(args.max_tickets),
                };
                self.client.send(from, self.address, &call, U256::ZERO).await
            }
        }
    }

    /// Sends the atomic, payable `purchaseTickets` (pays and mints).
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] on revert, timeout or transport failure.
    pub async fn purchase_tickets(
        &self,
        from: Address,
        id: EventId,
        quantity: u64,
        value: U256,
    ) -> Result<TransactionReceipt, ChainError> {
        let call = event_factory::purchaseTicketsCall {
            eventId: id.to_u256(),
            quantity: U256::from(quantity),
        };
        self.client.send(from, self.address, &call, value).await
    }

    /// Sends the legacy payment-only `buyTicket`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] on revert, timeout or transport failure.
    pub async fn buy_ticket(
        &self,
        from: Address,
        id: EventId,
        quantity: u64,
        value: U256,
    ) -> Result<TransactionReceipt, ChainError> {
        let call = event_factory::buyTicketCall {
            eventId: id.to_u256(),
            quantity: U256::from(quantity),
        };
        self.client.send(from, self.address, &call, value).await
    }
}

/// A decoded `TicketMinted` log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintedTicket {
    /// Token identifier.
    pub token_id: TicketId,
    /// Recipient of the mint.
    pub owner: Address,
    /// Event the ticket belongs to.
    pub event_id: EventId,
}

impl MintedTicket {
    /// Decodes a `TicketMinted` log.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch if the log is not a
    /// well-formed `TicketMinted` record.
    pub fn decode(log: &Log) -> Result<Self, String> {
        let event = ticket_nft::TicketMinted::decode_raw_log(log.topics.iter().copied(), &log.data)
            .map_err(|e| e.to_string())?;
        let token_id = TicketId::try_from(event.tokenId).map_err(|e| e.to_string())?;
        let event_id = EventId::try_from(event.eventId).map_err(|e| e.to_string())?;
        Ok(Self {
            token_id,
            owner: event.owner,
            event_id,
        })
    }
}

/// Typed accessor to a deployed TicketNFT.
#[derive(Debug, Clone)]
pub struct TicketNft {
    client: ChainClient,
    address: Address,
}

impl TicketNft {
    /// Binds the ABI to `address`.
    #[must_use]
    pub fn new(client: ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Contract address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// `tokenURI(tokenId)`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the call fails or reverts.
    pub async fn token_uri(&self, id: TicketId) -> Result<String, ChainError> {
        let call = ticket_nft::tokenURICall {
            tokenId: id.to_u256(),
        };
        self.client.read(self.address, &call).await
    }

    /// `ownerOf(tokenId)`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the call fails or reverts.
    pub async fn owner_of(&self, id: TicketId) -> Result<Address, ChainError> {
        let call = ticket_nft::ownerOfCall {
            tokenId: id.to_u256(),
        };
        self.client.read(self.address, &call).await
    }

    /// Sends `mintTicket(to, eventId, uri)` from `from`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] on revert, timeout or transport failure.
    pub async fn mint_ticket(
        &self,
        from: Address,
        to: Address,
        event_id: EventId,
        uri: &str,
    ) -> Result<TransactionReceipt, ChainError> {
        let call = ticket_nft::mintTicketCall {
            to,
            eventId: event_id.to_u256(),
            uri: uri.to_string(),
        };
        self.client.send(from, self.address, &call, U256::ZERO).await
    }

    /// `TicketMinted` confirmations this contract emitted in `receipt`.
    ///
    /// Logs from other contracts, other events or with an unexpected shape
    /// are ignored.
    #[must_use]
    pub fn minted_in(&self, receipt: &TransactionReceipt) -> Vec<MintedTicket> {
        receipt
            .logs_from(self.address)
            .filter(|log| log.topics.first() == Some(&ticket_nft::TicketMinted::SIGNATURE_HASH))
            .filter_map(|log| MintedTicket::decode(log).ok())
            .collect()
    }
}
