//! Correlation test utilities.

use pcgz_core::Block;

use crate::batch::{
    BitTripleBatch, CotReceiverBatch, CotSenderBatch, RotReceiverBatch, RotSenderBatch,
    Z2kTripleBatch,
};

/// Asserts the correctness of correlated oblivious transfer.
pub fn assert_cot(sender: &CotSenderBatch, receiver: &CotReceiverBatch) {
    assert_eq!(sender.msgs().len(), receiver.msgs().len());
    assert_cot_msgs(
        sender.delta(),
        receiver.choices(),
        sender.msgs(),
        receiver.msgs(),
    );
}

/// Asserts `received[i] = msgs[i] ^ choices[i] * delta` for every `i`.
pub fn assert_cot_msgs(delta: Block, choices: &[bool], msgs: &[Block], received: &[Block]) {
    assert!(choices
        .iter()
        .zip(msgs.iter().zip(received))
        .all(|(&choice, (&msg, &received))| {
            if choice {
                received == msg ^ delta
            } else {
                received == msg
            }
        }));
}

/// Asserts the correctness of random oblivious transfer.
pub fn assert_rot(sender: &RotSenderBatch, receiver: &RotReceiverBatch) {
    assert_eq!(sender.msgs().len(), receiver.msgs().len());
    assert!(receiver
        .choices()
        .iter()
        .zip(sender.msgs().iter().zip(receiver.msgs()))
        .all(|(&choice, (msg, received))| *received == msg[choice as usize]));
}

/// Asserts `(a_S ^ a_R)(b_S ^ b_R) = c_S ^ c_R` for every triple.
pub fn assert_bit_triples(sender: &BitTripleBatch, receiver: &BitTripleBatch) {
    assert_eq!(sender.a().len(), receiver.a().len());
    for i in 0..sender.a().len() {
        let a = sender.a()[i] ^ receiver.a()[i];
        let b = sender.b()[i] ^ receiver.b()[i];
        let c = sender.c()[i] ^ receiver.c()[i];
        assert_eq!(a & b, c, "bit triple {i} is not multiplicative");
    }
}

/// Asserts `(a_S + a_R)(b_S + b_R) = c_S + c_R` in the ring of both batches.
pub fn assert_z2k_triples(sender: &Z2kTripleBatch, receiver: &Z2kTripleBatch) {
    assert_eq!(sender.ring(), receiver.ring());
    assert_eq!(sender.a().len(), receiver.a().len());

    let ring = sender.ring();
    for i in 0..sender.a().len() {
        let a = ring.add(sender.a()[i], receiver.a()[i]);
        let b = ring.add(sender.b()[i], receiver.b()[i]);
        let c = ring.add(sender.c()[i], receiver.c()[i]);
        assert_eq!(ring.mul(a, b), c, "z2k triple {i} is not multiplicative");
    }
}
