//! Signed transfer transactions.

use bytes::Bytes;
use prost::Message;
use serde::{Deserialize, Serialize};
use siege_primitives::Address;
use siege_wire::{TxHash, encode_big_uint, proto::Transaction};

use crate::{PayloadError, Wallet};

/// Decimals of the native token.
pub const DENOMINATION: u32 = 18;

pub const DEFAULT_GAS_PRICE: u64 = 200_000_000_000;
pub const DEFAULT_GAS_LIMIT: u64 = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasParams {
    pub price: u64,
    pub limit: u64,
}

impl Default for GasParams {
    fn default() -> Self {
        Self {
            price: DEFAULT_GAS_PRICE,
            limit: DEFAULT_GAS_LIMIT,
        }
    }
}

/// The JSON form a transfer signature covers. Field order is significant.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigningForm<'a> {
    nonce: u64,
    value: String,
    receiver: String,
    sender: String,
    gas_price: u64,
    gas_limit: u64,
    #[serde(skip_serializing_if = "str::is_empty")]
    data: &'a str,
}

/// A signed, serialized transfer.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub tx: Transaction,
    pub hash: TxHash,
    pub receiver: Address,
    pub bytes: Bytes,
}

/// Builds transfers from one wallet with fixed value, data and gas.
#[derive(Debug)]
pub struct TransferBuilder<'a> {
    wallet: &'a Wallet,
    gas: GasParams,
    value: u128,
    data: Bytes,
}

impl<'a> TransferBuilder<'a> {
    pub fn new(wallet: &'a Wallet, gas: GasParams) -> Self {
        Self {
            wallet,
            gas,
            value: 0,
            data: Bytes::new(),
        }
    }

    /// Value in base units.
    pub fn value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    pub fn build(&self, receiver: Address, nonce: u64) -> Result<Transfer, PayloadError> {
        let data = String::from_utf8_lossy(&self.data);
        let form = SigningForm {
            nonce,
            value: self.value.to_string(),
            receiver: receiver.to_hex(),
            sender: self.wallet.address().to_hex(),
            gas_price: self.gas.price,
            gas_limit: self.gas.limit,
            data: &data,
        };
        let signature = self.wallet.sign(&serde_json::to_vec(&form)?);

        let tx = Transaction {
            nonce,
            value: encode_big_uint(self.value),
            rcv_addr: receiver.as_bytes().to_vec(),
            snd_addr: self.wallet.address().as_bytes().to_vec(),
            gas_price: self.gas.price,
            gas_limit: self.gas.limit,
            data: self.data.to_vec(),
            signature: signature.to_bytes().to_vec(),
        };
        let bytes = Bytes::from(tx.encode_to_vec());
        Ok(Transfer {
            hash: TxHash::of(&bytes),
            tx,
            receiver,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signature, SigningKey, Verifier};

    use super::*;

    #[test]
    fn signs_the_json_form() {
        let wallet = Wallet::from_secret([5; 32]);
        let receiver = Address::new([9; 32]);
        let transfer = TransferBuilder::new(&wallet, GasParams::default())
            .value(1_000)
            .data(Bytes::from_static(b"hello"))
            .build(receiver, 7)
            .unwrap();

        let expected = format!(
            r#"{{"nonce":7,"value":"1000","receiver":"{}","sender":"{}","gasPrice":200000000000,"gasLimit":50000,"data":"hello"}}"#,
            receiver.to_hex(),
            wallet.address().to_hex(),
        );
        let signature = Signature::from_slice(&transfer.tx.signature).unwrap();
        let key = SigningKey::from_bytes(&[5; 32]).verifying_key();
        assert!(key.verify(expected.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn encodes_the_wire_transaction() {
        let wallet = Wallet::from_secret([5; 32]);
        let transfer = TransferBuilder::new(&wallet, GasParams::default())
            .value(256)
            .build(Address::new([9; 32]), 1)
            .unwrap();

        let decoded = Transaction::decode(transfer.bytes.clone()).unwrap();
        assert_eq!(decoded, transfer.tx);
        assert_eq!(decoded.value, vec![0, 1, 0]);
        assert_eq!(decoded.snd_addr, wallet.address().as_bytes().to_vec());
        assert_eq!(transfer.hash, TxHash::of(&transfer.bytes));
    }
}
