use std::collections::BTreeMap;

use tracing::trace;

use super::{Readable, StreamInput, StreamOutput, Writeable};
use crate::error::DecodeError;
use crate::types::{NodeIdentity, TransportAddress, Version};

impl Writeable for Version {
    fn write_to(&self, out: &mut StreamOutput) {
        out.write_vint(self.id());
    }
}

impl Readable for Version {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError> {
        Ok(Version::from_id(input.read_vint()?))
    }
}

impl Writeable for NodeIdentity {
    fn write_to(&self, out: &mut StreamOutput) {
        out.write_string(self.name());
        out.write_string(self.id());
        out.write_string(self.host_name());
        out.write_string(self.host_address());
        self.address().write_to(out);
        out.write_vint(self.attributes().len() as u32);
        for (key, value) in self.attributes() {
            out.write_string(key);
            out.write_string(value);
        }
        self.version().write_to(out);
    }
}

impl Readable for NodeIdentity {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError> {
        let name = input.read_string()?;
        let id = input.read_string()?;
        if id.is_empty() {
            return Err(DecodeError::EmptyNodeId);
        }
        let host_name = input.read_string()?;
        let host_address = input.read_string()?;
        let address = TransportAddress::read_from(input)?;

        let count = input.read_vint()?;
        // every pair takes at least two length bytes
        if count as usize > input.remaining() / 2 {
            return Err(DecodeError::InvalidLength(count));
        }
        let mut attributes = BTreeMap::new();
        for _ in 0..count {
            let key = input.read_string()?;
            let value = input.read_string()?;
            if attributes.contains_key(&key) {
                return Err(DecodeError::DuplicateAttribute(key));
            }
            attributes.insert(key, value);
        }
        let version = Version::read_from(input)?;

        trace!(node_id = %id, %address, attributes = attributes.len(), "decoded node");
        NodeIdentity::with_host(name, id, host_name, host_address, address, attributes, version)
            .map_err(|_| DecodeError::EmptyNodeId)
    }
}

/// Writes a varint count followed by each node.
pub fn write_nodes<'a>(out: &mut StreamOutput, nodes: impl ExactSizeIterator<Item = &'a NodeIdentity>) {
    out.write_vint(nodes.len() as u32);
    for node in nodes {
        node.write_to(out);
    }
}

/// Reads a list written by [`write_nodes`].
pub fn read_nodes(input: &mut StreamInput<'_>) -> Result<Vec<NodeIdentity>, DecodeError> {
    let count = input.read_vint()?;
    if count as usize > input.remaining() {
        return Err(DecodeError::InvalidLength(count));
    }
    (0..count).map(|_| NodeIdentity::read_from(input)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{decode, encode};

    fn sample() -> NodeIdentity {
        NodeIdentity::with_host(
            "node-1",
            "6f1a0d9e-3c1b-4f7e-8a52-0b7d4c6e9f21",
            "db1.internal",
            "10.0.0.5",
            TransportAddress::inet("10.0.0.5:9300".parse().unwrap()),
            [("master", "false"), ("rack", "r1")],
            Version::V_2_4_0,
        )
        .unwrap()
    }

    #[test]
    fn test_field_order() {
        let bytes = encode(&sample());
        let mut input = StreamInput::new(&bytes);
        assert_eq!(input.read_string().unwrap(), "node-1");
        assert_eq!(input.read_string().unwrap(), "6f1a0d9e-3c1b-4f7e-8a52-0b7d4c6e9f21");
        assert_eq!(input.read_string().unwrap(), "db1.internal");
        assert_eq!(input.read_string().unwrap(), "10.0.0.5");
        assert_eq!(
            TransportAddress::read_from(&mut input).unwrap(),
            TransportAddress::inet("10.0.0.5:9300".parse().unwrap())
        );
        assert_eq!(input.read_vint().unwrap(), 2);
        assert_eq!(input.read_string().unwrap(), "master");
        assert_eq!(input.read_string().unwrap(), "false");
        assert_eq!(input.read_string().unwrap(), "rack");
        assert_eq!(input.read_string().unwrap(), "r1");
        assert_eq!(input.read_vint().unwrap(), Version::V_2_4_0.id());
        assert!(input.is_empty());
    }

    #[test]
    fn test_round_trip_keeps_all_fields() {
        let node = sample();
        let decoded: NodeIdentity = decode(&encode(&node)).unwrap();
        assert_eq!(decoded.name(), node.name());
        assert_eq!(decoded.id(), node.id());
        assert_eq!(decoded.uuid(), node.uuid());
        assert_eq!(decoded.host_name(), node.host_name());
        assert_eq!(decoded.host_address(), node.host_address());
        assert_eq!(decoded.address(), node.address());
        assert_eq!(decoded.attributes(), node.attributes());
        assert_eq!(decoded.version(), node.version());
    }

    #[test]
    fn test_truncated_input_fails() {
        let bytes = encode(&sample());
        for cut in [0, 1, 10, bytes.len() / 2, bytes.len() - 1] {
            assert!(decode::<NodeIdentity>(&bytes[..cut]).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode(&sample());
        bytes.push(0);
        assert_eq!(decode::<NodeIdentity>(&bytes).unwrap_err(), DecodeError::TrailingBytes(1));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut out = StreamOutput::new();
        out.write_string("name");
        out.write_string("");
        assert_eq!(decode::<NodeIdentity>(out.as_slice()).unwrap_err(), DecodeError::EmptyNodeId);
    }

    #[test]
    fn test_huge_attribute_count() {
        let mut out = StreamOutput::new();
        for s in ["", "n1", "h", "a"] {
            out.write_string(s);
        }
        TransportAddress::Dummy.write_to(&mut out);
        out.write_vint(1_000_000);
        out.write_string("k");
        assert_eq!(
            decode::<NodeIdentity>(out.as_slice()).unwrap_err(),
            DecodeError::InvalidLength(1_000_000)
        );
    }

    #[test]
    fn test_repeated_attribute_key_rejected() {
        let mut out = StreamOutput::new();
        for s in ["", "n1", "h", "a"] {
            out.write_string(s);
        }
        TransportAddress::Dummy.write_to(&mut out);
        out.write_vint(2);
        for (key, value) in [("client", "true"), ("client", "false")] {
            out.write_string(key);
            out.write_string(value);
        }
        Version::CURRENT.write_to(&mut out);

        assert_eq!(
            decode::<NodeIdentity>(out.as_slice()).unwrap_err(),
            DecodeError::DuplicateAttribute("client".to_string())
        );
    }

    #[test]
    fn test_node_list() {
        let other = NodeIdentity::new("n2", TransportAddress::local("2"), Version::V_2_0_0).unwrap();
        let nodes = vec![sample(), other];

        let mut out = StreamOutput::new();
        write_nodes(&mut out, nodes.iter());
        let bytes = out.into_inner();
        let mut input = StreamInput::new(&bytes);
        let decoded = read_nodes(&mut input).unwrap();
        assert!(input.is_empty());
        assert_eq!(decoded, nodes);
        assert_eq!(decoded[1].address(), &TransportAddress::local("2"));
    }
}
